use std::{
    cell::RefCell,
    rc::Rc,
    sync::{Mutex, OnceLock},
    thread::{self, ThreadId},
};

use shiftview::{
    boot::AssetLoader,
    data_structures::{
        scene_graph::{Hierarchy, Scene, SceneSink, Stage},
        transform::Transform,
    },
};

/// Shared, ordered record of what the loader and the sink saw.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Loader answering from canned results instead of the network.
pub struct MockLoader {
    pub environment: Result<String, String>,
    pub model: Result<String, String>,
    pub journal: Journal,
}

impl MockLoader {
    pub fn succeeding(journal: &Journal) -> Self {
        Self {
            environment: Ok("dusk.hdr".to_string()),
            model: Ok("helmet".to_string()),
            journal: journal.clone(),
        }
    }
}

impl AssetLoader for MockLoader {
    type Environment = String;
    type Model = String;

    async fn load_environment(&self, url: &str) -> anyhow::Result<String> {
        self.journal
            .borrow_mut()
            .push(format!("load environment {}", url));
        self.environment.clone().map_err(anyhow::Error::msg)
    }

    async fn load_model(&self, url: &str) -> anyhow::Result<String> {
        self.journal.borrow_mut().push(format!("load model {}", url));
        self.model.clone().map_err(anyhow::Error::msg)
    }
}

/// Applies boot results to a plain scene and journals each call.
pub struct JournalSink {
    pub scene: Scene<String, String>,
    pub journal: Journal,
}

impl JournalSink {
    pub fn new(journal: &Journal) -> Self {
        Self {
            scene: Scene::new(),
            journal: journal.clone(),
        }
    }
}

impl SceneSink<String, String> for JournalSink {
    fn install_environment(&mut self, environment: String) {
        self.journal
            .borrow_mut()
            .push(format!("install {}", environment));
        self.scene.install_environment(environment);
    }

    fn attach_model(&mut self, model: String) {
        self.journal.borrow_mut().push(format!("attach {}", model));
        self.scene.attach_model(model);
    }

    fn enter(&mut self, stage: Stage) {
        self.journal.borrow_mut().push(format!("enter {:?}", stage));
        self.scene.enter(stage);
    }
}

/// `log` backend keeping every record, tagged with the thread that emitted it.
pub struct CapturingLogger {
    records: Mutex<Vec<(ThreadId, log::Level, String)>>,
}

static LOGGER: OnceLock<CapturingLogger> = OnceLock::new();

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.records.lock().unwrap().push((
            thread::current().id(),
            record.level(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

impl CapturingLogger {
    /// Position to count from; earlier records are ignored.
    pub fn mark(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Messages at `level` logged by the current thread after `mark`.
    pub fn since(&self, mark: usize, level: log::Level) -> Vec<String> {
        let me = thread::current().id();
        self.records.lock().unwrap()[mark..]
            .iter()
            .filter(|(thread, l, _)| *thread == me && *l == level)
            .map(|(_, _, message)| message.clone())
            .collect()
    }
}

/// Install the capturing logger for this test binary (once) and return it.
pub fn capture_logs() -> &'static CapturingLogger {
    let logger = LOGGER.get_or_init(|| CapturingLogger {
        records: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
    logger
}

/// Scene graph node without GPU buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(name: &str, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            transform,
            children: Vec::new(),
        }
    }
}

impl Hierarchy for TreeNode {
    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    fn children(&self) -> &[TreeNode] {
        &self.children
    }

    fn add_child(&mut self, child: TreeNode) {
        self.children.push(child);
    }
}
