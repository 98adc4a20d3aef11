use futures::executor::block_on;
use shiftview::{
    boot::{BootError, populate},
    config::AssetPaths,
    data_structures::scene_graph::Stage,
};

use crate::common::test_utils::{JournalSink, MockLoader, capture_logs, journal};

mod common;

fn assets() -> AssetPaths {
    AssetPaths {
        environment: "sky.hdr".to_string(),
        model: "helmet.gltf".to_string(),
    }
}

#[test]
fn environment_is_installed_before_model_is_requested() {
    let journal = journal();
    let loader = MockLoader::succeeding(&journal);
    let mut sink = JournalSink::new(&journal);

    block_on(populate(&loader, &mut sink, &assets())).unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            "enter EnvironmentLoading",
            "load environment sky.hdr",
            "install dusk.hdr",
            "enter ModelLoading",
            "load model helmet.gltf",
            "attach helmet",
            "enter Ready",
        ]
    );
}

#[test]
fn model_is_requested_exactly_once() {
    let journal = journal();
    let loader = MockLoader::succeeding(&journal);
    let mut sink = JournalSink::new(&journal);

    block_on(populate(&loader, &mut sink, &assets())).unwrap();

    let requests = journal
        .borrow()
        .iter()
        .filter(|entry| entry.starts_with("load model"))
        .count();
    assert_eq!(requests, 1);
    assert_eq!(sink.scene.environment().map(String::as_str), Some("dusk.hdr"));
}

#[test]
fn loaded_model_is_the_only_child() {
    let journal = journal();
    let loader = MockLoader::succeeding(&journal);
    let mut sink = JournalSink::new(&journal);

    block_on(populate(&loader, &mut sink, &assets())).unwrap();

    assert_eq!(sink.scene.children(), ["helmet".to_string()]);
    assert_eq!(sink.scene.model().map(String::as_str), Some("helmet"));
    assert_eq!(sink.scene.stage(), Stage::Ready);
}

#[test]
fn failed_environment_never_requests_the_model() {
    let logs = capture_logs();
    let mark = logs.mark();
    let journal = journal();
    let loader = MockLoader {
        environment: Err("404 Not Found".to_string()),
        ..MockLoader::succeeding(&journal)
    };
    let mut sink = JournalSink::new(&journal);

    let result = block_on(populate(&loader, &mut sink, &assets()));

    match result {
        Err(BootError::Environment { url, .. }) => assert_eq!(url, "sky.hdr"),
        other => panic!("expected an environment error, got {:?}", other),
    }
    assert!(journal.borrow().iter().all(|e| !e.starts_with("load model")));
    assert!(sink.scene.environment().is_none());
    assert!(sink.scene.children().is_empty());
    assert_eq!(sink.scene.stage(), Stage::EnvironmentLoading);

    let errors = logs.since(mark, log::Level::Error);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("404 Not Found"));
}
