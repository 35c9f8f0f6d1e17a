use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use ytcreator_chain::{
    ChainError, LlmSettings, LookupError, Pipeline, PipelineResult, PipelineStage, ResearchLookup,
    SessionLimits, SessionRegistry,
};
use std::time::Duration;
use ytcreator_llm::{ChatClient, ChatRequest, ChatResponse};

/// Answers title prompts and script prompts with fixed text
struct ScriptedModel {
    title: Option<&'static str>,
    script: &'static str,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(title: Option<&'static str>, script: &'static str) -> Arc<Self> {
        Arc::new(Self {
            title,
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request
            .messages
            .last()
            .map(|m| m.content().to_string())
            .unwrap_or_default();

        if prompt.starts_with("Write me a YouTube video title about") {
            match self.title {
                Some(title) => Ok(ChatResponse::text(title)),
                None => anyhow::bail!("OpenAI API error (503): overloaded"),
            }
        } else {
            Ok(ChatResponse::text(self.script))
        }
    }
}

struct StubLookup {
    result: Option<&'static str>,
    queries: std::sync::Mutex<Vec<String>>,
}

impl StubLookup {
    fn new(result: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            result,
            queries: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResearchLookup for StubLookup {
    async fn run(&self, query: &str) -> Result<String, LookupError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result
            .map(String::from)
            .ok_or_else(|| LookupError::NoResult(query.to_string()))
    }
}

fn pipeline(model: &Arc<ScriptedModel>, lookup: &Arc<StubLookup>) -> Pipeline {
    Pipeline::new(model.clone(), lookup.clone(), LlmSettings::default()).unwrap()
}

#[tokio::test]
async fn test_empty_topic_is_a_no_op() {
    let model = ScriptedModel::new(Some("Volcano Mysteries"), "Hot rocks.");
    let lookup = StubLookup::new(Some("Volcanoes are..."));
    let pipeline = pipeline(&model, &lookup);
    let mut session = pipeline.new_session();

    assert_eq!(pipeline.submit(&mut session, "").await.unwrap(), None);
    assert_eq!(pipeline.submit(&mut session, "   ").await.unwrap(), None);

    assert_eq!(model.calls(), 0);
    assert!(lookup.queries().is_empty());
    assert!(session.title_history().is_empty());
    assert!(session.script_history().is_empty());
    assert_eq!(session.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn test_full_submission() {
    let model = ScriptedModel::new(Some("Volcano Mysteries"), "Hot rocks.");
    let lookup = StubLookup::new(Some("Volcanoes are..."));
    let pipeline = pipeline(&model, &lookup);
    let mut session = pipeline.new_session();

    let result = pipeline.submit(&mut session, "volcanoes").await.unwrap();

    assert_eq!(
        result,
        Some(PipelineResult {
            title: "Volcano Mysteries".to_string(),
            script: "Hot rocks.".to_string(),
            research: "Volcanoes are...".to_string(),
        })
    );
    assert_eq!(model.calls(), 2);
    assert_eq!(lookup.queries(), vec!["volcanoes".to_string()]);
    assert_eq!(session.title_history().len(), 1);
    assert_eq!(session.script_history().len(), 1);
    assert_eq!(session.stage(), PipelineStage::ScriptGenerated);

    assert_eq!(
        session.title_history().buffer(),
        "Human: Write me a YouTube video title about volcanoes\nAI: Volcano Mysteries"
    );
    assert_eq!(
        session.script_history().entries()[0].input,
        "Write me a YouTube video script based on this title TITLE: Volcano Mysteries \
         but also while leveraging this wikipedia research: Volcanoes are..."
    );
}

#[tokio::test]
async fn test_title_failure_aborts_before_lookup() {
    let model = ScriptedModel::new(None, "Hot rocks.");
    let lookup = StubLookup::new(Some("Volcanoes are..."));
    let pipeline = pipeline(&model, &lookup);
    let mut session = pipeline.new_session();

    let err = pipeline.submit(&mut session, "volcanoes").await.unwrap_err();

    assert!(matches!(err, ChainError::Model(_)));
    assert!(err.is_upstream());
    assert_eq!(model.calls(), 1);
    assert!(lookup.queries().is_empty());
    assert!(session.title_history().is_empty());
    assert!(session.script_history().is_empty());
    assert_eq!(session.stage(), PipelineStage::Idle);
}

#[tokio::test]
async fn test_lookup_failure_keeps_title_history() {
    let model = ScriptedModel::new(Some("Volcano Mysteries"), "Hot rocks.");
    let lookup = StubLookup::new(None);
    let pipeline = pipeline(&model, &lookup);
    let mut session = pipeline.new_session();

    let err = pipeline.submit(&mut session, "volcanoes").await.unwrap_err();

    assert!(matches!(err, ChainError::Lookup(LookupError::NoResult(_))));
    assert_eq!(model.calls(), 1);
    assert_eq!(session.title_history().len(), 1);
    assert!(session.script_history().is_empty());
    assert_eq!(session.stage(), PipelineStage::TitleGenerated);
}

#[tokio::test]
async fn test_histories_accumulate_across_submissions() {
    let model = ScriptedModel::new(Some("Volcano Mysteries"), "Hot rocks.");
    let lookup = StubLookup::new(Some("Volcanoes are..."));
    let pipeline = pipeline(&model, &lookup);
    let mut session = pipeline.new_session();

    for topic in ["volcanoes", "lava", "magma"] {
        pipeline.submit(&mut session, topic).await.unwrap();
    }

    let inputs: Vec<&str> = session
        .title_history()
        .entries()
        .iter()
        .map(|e| e.input.as_str())
        .collect();
    assert_eq!(
        inputs,
        [
            "Write me a YouTube video title about volcanoes",
            "Write me a YouTube video title about lava",
            "Write me a YouTube video title about magma",
        ]
    );
    assert_eq!(session.script_history().len(), 3);
    assert_eq!(lookup.queries(), vec!["volcanoes", "lava", "magma"]);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let model = ScriptedModel::new(Some("Volcano Mysteries"), "Hot rocks.");
    let lookup = StubLookup::new(Some("Volcanoes are..."));
    let pipeline = Arc::new(pipeline(&model, &lookup));
    let registry = SessionRegistry::new();

    let a = registry.insert(pipeline.new_session()).await;
    let b = registry.insert(pipeline.new_session()).await;

    {
        let mut session = a.lock().await;
        pipeline.submit(&mut session, "volcanoes").await.unwrap();
    }

    assert_eq!(a.lock().await.title_history().len(), 1);
    assert!(b.lock().await.title_history().is_empty());
    assert!(b.lock().await.script_history().is_empty());
    assert_eq!(registry.len().await, 2);
}

#[tokio::test]
async fn test_registry_get_or_insert_and_remove() {
    let model = ScriptedModel::new(Some("t"), "s");
    let lookup = StubLookup::new(Some("r"));
    let pipeline = pipeline(&model, &lookup);
    let registry = SessionRegistry::new();

    let id = uuid::Uuid::new_v4();
    let first = registry
        .get_or_insert_with(id, || pipeline.new_session_with_id(id))
        .await;
    let second = registry
        .get_or_insert_with(id, || panic!("session should already exist"))
        .await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.lock().await.id(), id);
    assert!(registry.remove(&id).await);
    assert!(!registry.remove(&id).await);
    assert!(registry.get(&id).await.is_none());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_registry_evicts_expired_idle_sessions() {
    let model = ScriptedModel::new(Some("t"), "s");
    let lookup = StubLookup::new(Some("r"));
    let pipeline = pipeline(&model, &lookup);
    let registry = SessionRegistry::with_limits(SessionLimits::default().with_idle_ttl(Duration::ZERO));

    let stale = registry.insert(pipeline.new_session()).await;
    let stale_id = stale.lock().await.id();
    drop(stale);

    let held = registry.insert(pipeline.new_session()).await;
    let held_id = held.lock().await.id();

    assert!(registry.get(&stale_id).await.is_none());
    assert_eq!(registry.len().await, 1);

    // a session still held by a caller survives its TTL
    assert_eq!(registry.prune().await, 0);
    assert!(registry.get(&held_id).await.is_some());

    drop(held);
    assert_eq!(registry.prune().await, 1);
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_registry_caps_session_count() {
    let model = ScriptedModel::new(Some("t"), "s");
    let lookup = StubLookup::new(Some("r"));
    let pipeline = pipeline(&model, &lookup);
    let registry = SessionRegistry::with_limits(SessionLimits::default().with_max_sessions(2));

    let mut ids = Vec::new();
    for _ in 0..2 {
        let shared = registry.insert(pipeline.new_session()).await;
        ids.push(shared.lock().await.id());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // touching the oldest makes the second one least recently used
    assert!(registry.get(&ids[0]).await.is_some());
    tokio::time::sleep(Duration::from_millis(5)).await;

    let third = registry.insert(pipeline.new_session()).await;
    let third_id = third.lock().await.id();

    assert_eq!(registry.len().await, 2);
    assert!(registry.get(&ids[0]).await.is_some());
    assert!(registry.get(&ids[1]).await.is_none());
    assert!(registry.get(&third_id).await.is_some());
}
