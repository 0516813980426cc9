//! Non-blocking asset loads that report back on the frame thread.
//!
//! A load is a future plus two callbacks. The future runs in the background;
//! once it resolves, the matching callback is queued and runs on the next
//! [`LoadQueue::poll`], with exclusive access to the shared state. Callbacks
//! therefore never overlap with a frame or with each other.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    future::Future,
    rc::Rc,
};

type Completion<S> = Box<dyn FnOnce(&mut S)>;

pub struct LoadQueue<S: 'static> {
    completed: Rc<RefCell<VecDeque<Completion<S>>>>,
    in_flight: Rc<Cell<usize>>,
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Runtime,
    #[cfg(not(target_arch = "wasm32"))]
    local: tokio::task::LocalSet,
}

impl<S: 'static> LoadQueue<S> {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            completed: Rc::new(RefCell::new(VecDeque::new())),
            in_flight: Rc::new(Cell::new(0)),
            #[cfg(not(target_arch = "wasm32"))]
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?,
            #[cfg(not(target_arch = "wasm32"))]
            local: tokio::task::LocalSet::new(),
        })
    }

    /// Start `load`. Exactly one of `on_load` / `on_error` runs later, from `poll`.
    pub fn load<T, F, L, E>(&self, load: F, on_load: L, on_error: E)
    where
        T: 'static,
        F: Future<Output = anyhow::Result<T>> + 'static,
        L: FnOnce(&mut S, T) + 'static,
        E: FnOnce(&mut S, anyhow::Error) + 'static,
    {
        let completed = Rc::clone(&self.completed);
        let in_flight = Rc::clone(&self.in_flight);
        in_flight.set(in_flight.get() + 1);

        let task = async move {
            let completion: Completion<S> = match load.await {
                Ok(asset) => Box::new(move |state: &mut S| on_load(state, asset)),
                Err(err) => Box::new(move |state: &mut S| on_error(state, err)),
            };
            completed.borrow_mut().push_back(completion);
            in_flight.set(in_flight.get() - 1);
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.local.spawn_local(task);
        }
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task);
        }
    }

    /// Loads that have not delivered their callback yet.
    pub fn pending(&self) -> usize {
        self.in_flight.get() + self.completed.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Make progress on running loads and run every finished callback.
    /// Returns the number of callbacks that ran.
    pub fn poll(&mut self, state: &mut S) -> usize {
        #[cfg(not(target_arch = "wasm32"))]
        self.runtime
            .block_on(self.local.run_until(tokio::task::yield_now()));
        self.drain(state)
    }

    /// Block until every issued load has delivered its callback.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_until_idle(&mut self, state: &mut S) -> usize {
        let mut applied = 0;
        loop {
            let local = std::mem::take(&mut self.local);
            self.runtime.block_on(local);
            applied += self.drain(state);
            if self.is_idle() {
                return applied;
            }
        }
    }

    /// Run a future to completion on the loader runtime.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }

    fn drain(&mut self, state: &mut S) -> usize {
        let mut applied = 0;
        loop {
            let next = self.completed.borrow_mut().pop_front();
            match next {
                Some(completion) => {
                    completion(state);
                    applied += 1;
                }
                None => return applied,
            }
        }
    }
}
