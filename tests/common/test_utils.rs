#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    io::Cursor,
    rc::Rc,
};

use futures::channel::oneshot;

use flow_showcase::{
    camera::PerspectiveCamera,
    config::ShowcaseConfig,
    data_structures::scene_graph::Scene,
    flow::{FrameScheduler, RenderSurface},
    resources::{AssetSource, queue::LoadQueue},
    showcase::Showcase,
};

pub const MTL: &str = "\
newmtl body
Kd 1.0 0.5 0.0
Ns 10
map_Kd bus.png
";

pub const OBJ: &str = "\
mtllib bus.mtl
o body
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
usemtl body
f 1/1 2/2 3/3
";

/// A `width` x `height` PNG filled with one colour.
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encoding a png in memory");
    bytes.into_inner()
}

/// In-memory assets. Records every request in order and can hold a path
/// back until its gate is released.
#[derive(Default)]
pub struct MemorySource {
    files: RefCell<HashMap<String, Vec<u8>>>,
    requests: RefCell<Vec<String>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every asset the default config asks for.
    pub fn complete() -> Self {
        let source = Self::new();
        let assets = ShowcaseConfig::default().assets;
        source.insert(&assets.background, png(4, 2, [10, 20, 30, 255]));
        source.insert(&assets.road, png(2, 2, [50, 50, 50, 255]));
        source.insert(&assets.cube, png(2, 2, [200, 40, 0, 255]));
        source.insert(&assets.model_materials, MTL.as_bytes().to_vec());
        source.insert(&assets.model_geometry, OBJ.as_bytes().to_vec());
        source.insert("models/bus.png", png(1, 1, [255, 255, 0, 255]));
        source
    }

    pub fn insert(&self, path: &str, bytes: Vec<u8>) {
        self.files.borrow_mut().insert(path.to_string(), bytes);
    }

    pub fn remove(&self, path: &str) {
        self.files.borrow_mut().remove(path);
    }

    /// Hold requests for `path` until the returned sender fires or is dropped.
    pub fn gate(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(path.to_string(), rx);
        tx
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.requests.borrow().iter().position(|p| p == path)
    }
}

impl AssetSource for MemorySource {
    async fn load_binary(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.requests.borrow_mut().push(path.to_string());
        let gate = self.gates.borrow_mut().remove(path);
        if let Some(gate) = gate {
            // a dropped sender releases the gate too
            let _ = gate.await;
        }
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} not found", path))
    }
}

/// Assemble a showcase against `source` without running any load.
pub fn showcase_with(source: Rc<MemorySource>) -> (Showcase, LoadQueue<Showcase>) {
    let loads = LoadQueue::new().expect("creating the load queue");
    let showcase = Showcase::assemble(ShowcaseConfig::default(), source, &loads);
    (showcase, loads)
}

/// A surface that records what the frame loop asks of it.
pub struct FakeSurface {
    pub logical: (u32, u32),
    pub backing: (u32, u32),
    pub resizes: u32,
    pub reconfigures: u32,
    pub draws: u32,
    /// Returned by the next draws, in order.
    pub failures: VecDeque<wgpu::SurfaceError>,
}

impl FakeSurface {
    pub fn new(logical: (u32, u32), backing: (u32, u32)) -> Self {
        Self {
            logical,
            backing,
            resizes: 0,
            reconfigures: 0,
            draws: 0,
            failures: VecDeque::new(),
        }
    }
}

impl RenderSurface for FakeSurface {
    fn logical_size(&self) -> (u32, u32) {
        self.logical
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    fn resize_backing(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
        self.resizes += 1;
    }

    fn reconfigure(&mut self) {
        self.reconfigures += 1;
    }

    fn draw(&mut self, _: &Scene, _: &PerspectiveCamera) -> Result<(), wgpu::SurfaceError> {
        self.draws += 1;
        match self.failures.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeScheduler {
    pub requests: u32,
}

impl FrameScheduler for FakeScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {} to be close to {}",
        actual,
        expected
    );
}
