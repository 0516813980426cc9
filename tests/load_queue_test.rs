use flow_showcase::resources::{queue::LoadQueue, texture::decode_rgba_async};

use crate::common::test_utils::png;

mod common;

#[derive(Debug, Default)]
struct Log {
    loaded: Vec<u32>,
    errors: Vec<String>,
}

#[test]
fn should_deliver_results_only_when_polled() {
    let mut queue = LoadQueue::<Log>::new().unwrap();
    let mut log = Log::default();

    queue.load(
        async { anyhow::Ok(7) },
        |log: &mut Log, value| log.loaded.push(value),
        |log: &mut Log, e| log.errors.push(e.to_string()),
    );

    assert_eq!(queue.pending(), 1);
    assert!(log.loaded.is_empty());

    let applied = queue.poll(&mut log);

    assert_eq!(applied, 1);
    assert_eq!(log.loaded, vec![7]);
    assert!(queue.is_idle());
}

#[test]
fn should_route_failures_to_the_error_callback() {
    let mut queue = LoadQueue::<Log>::new().unwrap();
    let mut log = Log::default();

    queue.load(
        async { Err::<u32, _>(anyhow::anyhow!("missing file")) },
        |log: &mut Log, value| log.loaded.push(value),
        |log: &mut Log, e| log.errors.push(e.to_string()),
    );
    let applied = queue.run_until_idle(&mut log);

    assert_eq!(applied, 1);
    assert!(log.loaded.is_empty());
    assert_eq!(log.errors, vec!["missing file".to_string()]);
}

#[test]
fn should_keep_loads_pending_until_their_future_resolves() {
    let mut queue = LoadQueue::<Log>::new().unwrap();
    let mut log = Log::default();
    let (tx, rx) = futures::channel::oneshot::channel::<u32>();

    queue.load(
        async move { anyhow::Ok(rx.await?) },
        |log: &mut Log, value| log.loaded.push(value),
        |log: &mut Log, e| log.errors.push(e.to_string()),
    );

    assert_eq!(queue.poll(&mut log), 0);
    assert_eq!(queue.pending(), 1);

    tx.send(3).unwrap();
    assert_eq!(queue.run_until_idle(&mut log), 1);
    assert_eq!(log.loaded, vec![3]);
}

#[test]
fn should_wait_for_loads_unblocked_by_earlier_callbacks() {
    let mut queue = LoadQueue::<Vec<u32>>::new().unwrap();
    let mut values = Vec::new();

    let (tx, rx) = futures::channel::oneshot::channel::<u32>();
    queue.load(
        async { anyhow::Ok(1) },
        move |values: &mut Vec<u32>, value| {
            values.push(value);
            tx.send(value + 1).unwrap();
        },
        |_: &mut Vec<u32>, e| panic!("unexpected {e}"),
    );
    queue.load(
        async move { anyhow::Ok(rx.await?) },
        |values: &mut Vec<u32>, value| values.push(value),
        |_: &mut Vec<u32>, e| panic!("unexpected {e}"),
    );

    let applied = queue.run_until_idle(&mut values);

    assert_eq!(applied, 2);
    assert_eq!(values, vec![1, 2]);
    assert!(queue.is_idle());
}

#[test]
fn should_run_callbacks_in_completion_order() {
    let mut queue = LoadQueue::<Vec<u32>>::new().unwrap();
    let mut values = Vec::new();
    let (tx, rx) = futures::channel::oneshot::channel::<()>();

    queue.load(
        async move {
            rx.await?;
            anyhow::Ok(1)
        },
        |values: &mut Vec<u32>, value| values.push(value),
        |_: &mut Vec<u32>, e| panic!("unexpected {e}"),
    );
    queue.load(
        async { anyhow::Ok(2) },
        |values: &mut Vec<u32>, value| values.push(value),
        |_: &mut Vec<u32>, e| panic!("unexpected {e}"),
    );

    assert_eq!(queue.poll(&mut values), 1);
    tx.send(()).unwrap();
    queue.run_until_idle(&mut values);

    assert_eq!(values, vec![2, 1]);
}

#[test]
fn should_decode_images_in_the_background() {
    let mut queue = LoadQueue::<Vec<(u32, u32)>>::new().unwrap();
    let mut sizes = Vec::new();

    queue.load(
        decode_rgba_async(png(3, 2, [1, 2, 3, 255]), "a.png".to_string()),
        |sizes: &mut Vec<(u32, u32)>, image| sizes.push(image.dimensions()),
        |_: &mut Vec<(u32, u32)>, e| panic!("unexpected {e}"),
    );
    let applied = queue.run_until_idle(&mut sizes);

    assert_eq!(applied, 1);
    assert_eq!(sizes, vec![(3, 2)]);
}

#[test]
fn should_report_undecodable_images_by_name() {
    let mut queue = LoadQueue::<Log>::new().unwrap();
    let mut log = Log::default();

    queue.load(
        decode_rgba_async(b"not an image".to_vec(), "broken.png".to_string()),
        |log: &mut Log, _| log.loaded.push(0),
        |log: &mut Log, e| log.errors.push(e.to_string()),
    );
    queue.run_until_idle(&mut log);

    assert!(log.loaded.is_empty());
    assert_eq!(log.errors, vec!["Could not decode image broken.png".to_string()]);
}
