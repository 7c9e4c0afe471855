use crate::config::{LimitsConfig, StreamConfig};
use crate::core::math::{self, Number};
use crate::core::pool;
use crate::core::science;
use crate::core::text::{excerpt, first_sentence, truncate_at_word};
use crate::domain::model::{
    AgentResponse, Article, ModelKind, ModelRun, OutputField, StreamEvent, Track,
};
use crate::domain::ports::KnowledgeSource;
use crate::utils::error::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const WIKIPEDIA_SUFFIX: &str = "\n\nSource: Wikipedia";
const SENTENCE_MAX_CHARS: usize = 320;
const SYNTHESIS_PREFIX: &str = "Final combined answer: ";

/// What a model dug up for one query, before it is rendered into text.
#[derive(Debug, Clone, PartialEq)]
enum Findings {
    Math(Option<Number>),
    Science(Option<String>),
    Fact(Option<String>),
    News(Vec<Article>),
    Music(Vec<Track>),
}

/// Fans a query out over the model pool and stitches the answers together.
///
/// Models run one after another. Every lookup failure is logged and replaced
/// by a placeholder, so callers always get a complete answer.
pub struct AgentEngine {
    source: Arc<dyn KnowledgeSource>,
    limits: LimitsConfig,
}

impl AgentEngine {
    pub fn new(source: Arc<dyn KnowledgeSource>, limits: LimitsConfig) -> Self {
        Self { source, limits }
    }

    async fn best_effort<T: Default>(service: &str, call: impl Future<Output = Result<T>>) -> T {
        match call.await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("⚠️ {} lookup failed, degrading: {}", service, e);
                T::default()
            }
        }
    }

    async fn raw_summary(&self, topic: &str) -> Option<String> {
        Self::best_effort("encyclopedia", self.source.encyclopedia_summary(topic)).await
    }

    /// Encyclopedia summary ready for display: word-truncated and attributed.
    async fn summary(&self, topic: &str) -> Option<String> {
        self.raw_summary(topic).await.map(|text| {
            format!(
                "{}{}",
                truncate_at_word(&text, self.limits.summary_max_chars),
                WIKIPEDIA_SUFFIX
            )
        })
    }

    async fn lead_sentence(&self, topic: &str) -> Option<String> {
        self.raw_summary(topic).await.map(|text| {
            format!(
                "{}{}",
                first_sentence(&text, SENTENCE_MAX_CHARS),
                WIKIPEDIA_SUFFIX
            )
        })
    }

    /// A fact that leans on whatever else was selected: the artist behind the
    /// query when Music runs, the query itself when the Science Dictionary
    /// runs, and a random fact or number trivia otherwise.
    async fn context_fact(&self, query: &str, selected: &[String]) -> Option<String> {
        if pool::is_selected(selected, ModelKind::Music) {
            let tracks = Self::best_effort("music", self.source.top_tracks(query, 1)).await;
            let artist = tracks
                .first()
                .and_then(|t| t.artist.as_deref())
                .unwrap_or(query)
                .trim()
                .to_string();
            if let Some(fact) = self.lead_sentence(&artist).await {
                return Some(fact);
            }
        }

        if pool::is_selected(selected, ModelKind::ScienceDictionary) {
            if let Some(fact) = self.lead_sentence(query).await {
                return Some(fact);
            }
        }

        if let Some(fact) = Self::best_effort("random-fact", self.source.random_fact()).await {
            return Some(fact);
        }
        Self::best_effort("numbers", self.source.number_trivia("random")).await
    }

    async fn investigate(&self, kind: ModelKind, query: &str, selected: &[String]) -> Findings {
        tracing::debug!("{} ({}) investigating", kind.name(), kind.specialty());
        match kind {
            ModelKind::Math => Findings::Math(math::evaluate(query)),
            ModelKind::ScienceDictionary => match science::lookup(query) {
                Some(answer) => {
                    Findings::Science(Some(format!("{}{}", answer, science::SOURCE_SUFFIX)))
                }
                None => Findings::Science(self.summary(query).await),
            },
            ModelKind::RandomFacts => Findings::Fact(self.context_fact(query, selected).await),
            ModelKind::News => Findings::News(
                Self::best_effort(
                    "news",
                    self.source.headlines(query, self.limits.headline_limit),
                )
                .await,
            ),
            ModelKind::Music => Findings::Music(
                Self::best_effort("music", self.source.top_tracks(query, self.limits.track_limit))
                    .await,
            ),
        }
    }

    /// Runs the selected models and answers in one go.
    pub async fn run(&self, query: &str, requested: &[String]) -> AgentResponse {
        let kinds = pool::select_requested(requested);
        tracing::info!("🚀 Running {} model(s) for query {:?}", kinds.len(), query);

        let mut models = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let findings = self.investigate(kind, query, requested).await;
            let (initial, final_output) = direct_outputs(&findings, query);
            let mut run = ModelRun::from(kind);
            run.initial_output = Some(initial);
            run.final_output = Some(final_output);
            models.push(run);
        }

        let synthesized_insight = self.synthesize(&models);
        AgentResponse {
            models,
            synthesized_insight,
        }
    }

    /// Replays the run as a sequence of events with cosmetic pauses in
    /// between. Stops as soon as the receiving side is gone.
    pub async fn run_staged(
        &self,
        query: &str,
        selected: Vec<String>,
        pacing: &StreamConfig,
        events: mpsc::Sender<StreamEvent>,
    ) {
        let kinds = pool::named_kinds(&selected);
        tracing::info!("📡 Streaming {} model(s) for query {:?}", kinds.len(), query);

        let mut models: Vec<ModelRun> = kinds.iter().copied().map(ModelRun::from).collect();
        let mut finals = Vec::with_capacity(kinds.len());

        let assignment =
            StreamEvent::timeline("Assigned tasks to selected models", selected.join(", "));
        if !emit(&events, assignment, pacing.assignment_delay()).await {
            return;
        }

        for (kind, run) in kinds.iter().zip(models.iter_mut()) {
            let findings = self.investigate(*kind, query, &selected).await;
            let (initial, final_output) = staged_outputs(&findings, query);
            run.initial_output = Some(initial.clone());
            finals.push(final_output);

            let update = StreamEvent::ModelUpdate {
                model: run.name.clone(),
                field: OutputField::InitialOutput,
                value: initial,
            };
            if !emit(&events, update, pacing.model_delay()).await {
                return;
            }
        }

        let review = StreamEvent::timeline(
            "Cross-review & collaboration",
            "Models read each other and refine",
        );
        if !emit(&events, review, pacing.review_delay()).await {
            return;
        }

        for (run, final_output) in models.iter_mut().zip(finals) {
            run.final_output = Some(final_output.clone());
            let update = StreamEvent::ModelUpdate {
                model: run.name.clone(),
                field: OutputField::FinalOutput,
                value: final_output,
            };
            if !emit(&events, update, pacing.model_delay()).await {
                return;
            }
        }

        let merged = StreamEvent::timeline(
            "Synthesizer merged results",
            "Conflicts resolved, caveats added",
        );
        if !emit(&events, merged, Duration::ZERO).await {
            return;
        }

        let synthesized_insight = self.synthesize(&models);
        emit(
            &events,
            StreamEvent::Final {
                models,
                synthesized_insight,
            },
            Duration::ZERO,
        )
        .await;
    }

    /// Leading excerpt of every final output, joined behind a fixed prefix.
    pub fn synthesize(&self, models: &[ModelRun]) -> String {
        let parts: Vec<&str> = models
            .iter()
            .map(|run| {
                let output = run.final_output.as_deref().unwrap_or_default();
                excerpt(output, self.limits.excerpt_chars)
            })
            .collect();
        format!("{}{}", SYNTHESIS_PREFIX, parts.join(" "))
    }
}

async fn emit(events: &mpsc::Sender<StreamEvent>, event: StreamEvent, pause: Duration) -> bool {
    if events.send(event).await.is_err() {
        tracing::debug!("Stream receiver dropped, stopping staged run");
        return false;
    }
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
    true
}

fn render_headlines(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|a| format!("- {} ({})\n  {}", a.title, a.source, a.link))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_tracks(tracks: &[Track]) -> String {
    tracks
        .iter()
        .map(|t| {
            format!(
                "- {} — {} ({})\n  {}",
                t.track.as_deref().unwrap_or("unknown"),
                t.artist.as_deref().unwrap_or("unknown"),
                t.album.as_deref().unwrap_or("unknown"),
                t.store.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn math_outputs(result: Option<&Number>, query: &str) -> (String, String) {
    let initial = format!("Parsed arithmetic expression: {}", query);
    let final_output = match result {
        Some(n) => format!("Computed result = {}", n),
        None => "Could not compute a numeric result.".to_string(),
    };
    (initial, final_output)
}

fn listing_outputs(
    listing: String,
    initial_heading: &str,
    final_heading: &str,
    empty: &str,
) -> (String, String) {
    if listing.is_empty() {
        (empty.to_string(), empty.to_string())
    } else {
        (
            format!("{}\n{}", initial_heading, listing),
            format!("{}\n{}", final_heading, listing),
        )
    }
}

/// Outputs for the single-response endpoint.
fn direct_outputs(findings: &Findings, query: &str) -> (String, String) {
    match findings {
        Findings::Math(result) => math_outputs(result.as_ref(), query),
        Findings::Science(entry) => (
            format!("(Science) researched: {}", query),
            entry.clone().unwrap_or_else(|| "No article found.".to_string()),
        ),
        Findings::Fact(fact) => {
            let initial = if fact.is_some() {
                "Fetched a topical fact."
            } else {
                "Fetched a random fact."
            };
            (
                initial.to_string(),
                fact.clone().unwrap_or_else(|| "No fact available.".to_string()),
            )
        }
        Findings::News(articles) => listing_outputs(
            render_headlines(articles),
            "Top headlines:",
            "Curated headlines:",
            "No recent headlines found.",
        ),
        Findings::Music(tracks) => listing_outputs(
            render_tracks(tracks),
            "Top tracks:",
            "Playlist suggestion:",
            "No tracks found.",
        ),
    }
}

/// Outputs for the staged stream, where the initial output is already the
/// researched content and the final one is its reviewed form.
fn staged_outputs(findings: &Findings, query: &str) -> (String, String) {
    match findings {
        Findings::Science(entry) => {
            let initial = entry
                .clone()
                .unwrap_or_else(|| "No concise entry found.".to_string());
            let reviewed = format!("{}\n\n(Checked for obvious contradictions.)", initial)
                .trim()
                .to_string();
            (initial, reviewed)
        }
        Findings::Fact(fact) => {
            let fact = fact.clone().unwrap_or_else(|| "No fact available.".to_string());
            (fact.clone(), fact)
        }
        _ => direct_outputs(findings, query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AgentError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned answers keyed by lookup argument; `None` fields fail the call.
    #[derive(Default)]
    struct FakeSource {
        summaries: HashMap<String, String>,
        fact: Option<String>,
        trivia: Option<String>,
        articles: Option<Vec<Article>>,
        tracks: Option<Vec<Track>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn unavailable(service: &'static str) -> AgentError {
        AgentError::UpstreamStatus {
            service,
            status: 503,
        }
    }

    #[async_trait]
    impl KnowledgeSource for FakeSource {
        async fn encyclopedia_summary(&self, topic: &str) -> Result<Option<String>> {
            self.record(format!("summary:{}", topic));
            Ok(self.summaries.get(topic).cloned())
        }

        async fn random_fact(&self) -> Result<Option<String>> {
            self.record("fact".to_string());
            self.fact.clone().map(Some).ok_or_else(|| unavailable("random-fact"))
        }

        async fn number_trivia(&self, number: &str) -> Result<Option<String>> {
            self.record(format!("trivia:{}", number));
            self.trivia.clone().map(Some).ok_or_else(|| unavailable("numbers"))
        }

        async fn headlines(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
            self.record(format!("news:{}:{}", query, limit));
            self.articles.clone().ok_or_else(|| unavailable("news"))
        }

        async fn top_tracks(&self, term: &str, limit: usize) -> Result<Vec<Track>> {
            self.record(format!("music:{}:{}", term, limit));
            self.tracks
                .clone()
                .map(|t| t.into_iter().take(limit).collect())
                .ok_or_else(|| unavailable("music"))
        }
    }

    fn engine(source: FakeSource) -> (AgentEngine, Arc<FakeSource>) {
        let source = Arc::new(source);
        let engine = AgentEngine::new(source.clone(), LimitsConfig::default());
        (engine, source)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn queen_track() -> Track {
        Track {
            track: Some("Bohemian Rhapsody".to_string()),
            artist: Some("Queen".to_string()),
            album: Some("A Night at the Opera".to_string()),
            preview: None,
            store: Some("https://store/1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_run_math_only() {
        let (engine, source) = engine(FakeSource::default());

        let response = engine.run("2 + 3 * 4", &names(&["Model A"])).await;

        assert_eq!(response.models.len(), 1);
        let math = &response.models[0];
        assert_eq!(math.name, "Model A");
        assert_eq!(math.specialty, "Math");
        assert_eq!(
            math.initial_output.as_deref(),
            Some("Parsed arithmetic expression: 2 + 3 * 4")
        );
        assert_eq!(math.final_output.as_deref(), Some("Computed result = 14"));
        assert_eq!(
            response.synthesized_insight,
            "Final combined answer: Computed result = 14"
        );
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_math_rejects_prose() {
        let (engine, _) = engine(FakeSource::default());
        let response = engine.run("what is love", &names(&["Model A"])).await;
        assert_eq!(
            response.models[0].final_output.as_deref(),
            Some("Could not compute a numeric result.")
        );
    }

    #[tokio::test]
    async fn test_all_lookups_failing_degrades_to_placeholders() {
        let (engine, _) = engine(FakeSource::default());

        let response = engine.run("anything", &[]).await;

        let finals: Vec<&str> = response
            .models
            .iter()
            .map(|m| m.final_output.as_deref().unwrap())
            .collect();
        assert_eq!(
            finals,
            vec![
                "Could not compute a numeric result.",
                "No article found.",
                "No fact available.",
                "No recent headlines found.",
                "No tracks found.",
            ]
        );
        assert_eq!(
            response.models[2].initial_output.as_deref(),
            Some("Fetched a random fact.")
        );
        assert_eq!(
            response.models[3].initial_output.as_deref(),
            Some("No recent headlines found.")
        );
    }

    #[tokio::test]
    async fn test_science_table_short_circuits_encyclopedia() {
        let (engine, source) = engine(FakeSource::default());

        let response = engine
            .run("What is the speed of light?", &names(&["Model B"]))
            .await;

        assert_eq!(
            response.models[0].final_output.as_deref(),
            Some(
                "The speed of light in a vacuum is 299,792,458 metres per second.\n\n\
                 Source: Science table"
            )
        );
        assert_eq!(
            response.models[0].initial_output.as_deref(),
            Some("(Science) researched: What is the speed of light?")
        );
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_science_summary_is_truncated_and_attributed() {
        let long_extract = format!("{} tail", "lorem ipsum ".repeat(150));
        let mut summaries = HashMap::new();
        summaries.insert("Lorem".to_string(), long_extract);
        let (engine, _) = engine(FakeSource {
            summaries,
            ..Default::default()
        });

        let response = engine.run("Lorem", &names(&["Model B"])).await;
        let output = response.models[0].final_output.clone().unwrap();

        assert!(output.ends_with(" ...\n\nSource: Wikipedia"));
        let body = output.trim_end_matches("\n\nSource: Wikipedia");
        assert!(body.chars().count() <= 1200 + " ...".len());
    }

    #[tokio::test]
    async fn test_context_fact_uses_artist_when_music_selected() {
        let mut summaries = HashMap::new();
        summaries.insert(
            "Queen".to_string(),
            "Queen are a British rock band. They formed in London in 1970.".to_string(),
        );
        let (engine, source) = engine(FakeSource {
            summaries,
            tracks: Some(vec![queen_track()]),
            ..Default::default()
        });

        let response = engine
            .run("bohemian rhapsody", &names(&["Model C", "Model E"]))
            .await;

        let fact = &response.models[0];
        assert_eq!(fact.name, "Model C");
        assert_eq!(
            fact.initial_output.as_deref(),
            Some("Fetched a topical fact.")
        );
        assert_eq!(
            fact.final_output.as_deref(),
            Some("Queen are a British rock band.\n\nSource: Wikipedia")
        );
        assert!(source.calls().contains(&"music:bohemian rhapsody:1".to_string()));
        assert!(source.calls().contains(&"summary:Queen".to_string()));
    }

    #[tokio::test]
    async fn test_context_fact_uses_query_when_science_selected() {
        let mut summaries = HashMap::new();
        summaries.insert(
            "Mars".to_string(),
            "Mars is the fourth planet. It is red.".to_string(),
        );
        let (engine, _) = engine(FakeSource {
            summaries,
            ..Default::default()
        });

        let response = engine.run("Mars", &names(&["model b", "Model C"])).await;

        assert_eq!(response.models.len(), 1);
        assert_eq!(
            response.models[0].final_output.as_deref(),
            Some("Mars is the fourth planet.\n\nSource: Wikipedia")
        );
    }

    #[tokio::test]
    async fn test_context_fact_falls_back_to_trivia() {
        let (engine, source) = engine(FakeSource {
            trivia: Some("7 is the number of days in a week.".to_string()),
            ..Default::default()
        });

        let response = engine.run("nothing", &names(&["Model C"])).await;

        assert_eq!(
            response.models[0].final_output.as_deref(),
            Some("7 is the number of days in a week.")
        );
        assert_eq!(source.calls(), vec!["fact", "trivia:random"]);
    }

    #[tokio::test]
    async fn test_news_and_music_listings() {
        let (engine, source) = engine(FakeSource {
            articles: Some(vec![Article {
                title: "Rust ships".to_string(),
                link: "https://news/1".to_string(),
                published: "today".to_string(),
                source: "Daily".to_string(),
            }]),
            tracks: Some(vec![queen_track()]),
            ..Default::default()
        });

        let response = engine.run("queen", &names(&["Model D", "Model E"])).await;

        assert_eq!(
            response.models[0].initial_output.as_deref(),
            Some("Top headlines:\n- Rust ships (Daily)\n  https://news/1")
        );
        assert_eq!(
            response.models[0].final_output.as_deref(),
            Some("Curated headlines:\n- Rust ships (Daily)\n  https://news/1")
        );
        assert_eq!(
            response.models[1].final_output.as_deref(),
            Some(
                "Playlist suggestion:\n\
                 - Bohemian Rhapsody — Queen (A Night at the Opera)\n  https://store/1"
            )
        );
        assert!(source.calls().contains(&"news:queen:3".to_string()));
        assert!(source.calls().contains(&"music:queen:5".to_string()));
    }

    #[tokio::test]
    async fn test_synthesis_truncates_each_output() {
        let (engine, _) = engine(FakeSource::default());
        let mut long = ModelRun::from(ModelKind::News);
        long.final_output = Some("x".repeat(300));
        let mut short = ModelRun::from(ModelKind::Math);
        short.final_output = Some("Computed result = 4".to_string());

        let insight = engine.synthesize(&[short, long]);

        assert_eq!(
            insight,
            format!("Final combined answer: Computed result = 4 {}", "x".repeat(140))
        );
        assert_eq!(engine.synthesize(&[]), "Final combined answer: ");
    }

    async fn collect_staged(
        engine: &AgentEngine,
        query: &str,
        selected: Vec<String>,
    ) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::channel(64);
        engine
            .run_staged(query, selected, &StreamConfig::immediate(), tx)
            .await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_staged_event_order() {
        let (engine, _) = engine(FakeSource::default());

        let events = collect_staged(&engine, "6*7", names(&["Model A", "Model B"])).await;

        assert_eq!(events.len(), 8);
        assert_eq!(
            events[0],
            StreamEvent::timeline("Assigned tasks to selected models", "Model A, Model B")
        );
        assert_eq!(
            events[1],
            StreamEvent::ModelUpdate {
                model: "Model A".to_string(),
                field: OutputField::InitialOutput,
                value: "Parsed arithmetic expression: 6*7".to_string(),
            }
        );
        assert_eq!(
            events[2],
            StreamEvent::ModelUpdate {
                model: "Model B".to_string(),
                field: OutputField::InitialOutput,
                value: "No concise entry found.".to_string(),
            }
        );
        assert_eq!(
            events[3],
            StreamEvent::timeline(
                "Cross-review & collaboration",
                "Models read each other and refine"
            )
        );
        assert_eq!(
            events[4],
            StreamEvent::ModelUpdate {
                model: "Model A".to_string(),
                field: OutputField::FinalOutput,
                value: "Computed result = 42".to_string(),
            }
        );
        assert_eq!(
            events[5],
            StreamEvent::ModelUpdate {
                model: "Model B".to_string(),
                field: OutputField::FinalOutput,
                value: "No concise entry found.\n\n(Checked for obvious contradictions.)"
                    .to_string(),
            }
        );
        assert_eq!(
            events[6],
            StreamEvent::timeline(
                "Synthesizer merged results",
                "Conflicts resolved, caveats added"
            )
        );
        match &events[7] {
            StreamEvent::Final {
                models,
                synthesized_insight,
            } => {
                assert_eq!(models.len(), 2);
                assert!(models
                    .iter()
                    .all(|m| m.initial_output.is_some() && m.final_output.is_some()));
                assert!(synthesized_insight.starts_with(
                    "Final combined answer: Computed result = 42 No concise entry found."
                ));
            }
            other => panic!("expected final event, got {:?}", other),
        }
    }

    /// `(model, field, value)` for every model update, in emission order.
    fn updates(events: &[StreamEvent]) -> Vec<(&str, OutputField, &str)> {
        events
            .iter()
            .filter_map(|event| match event {
                StreamEvent::ModelUpdate {
                    model,
                    field,
                    value,
                } => Some((model.as_str(), *field, value.as_str())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_staged_outputs_for_lookup_models() {
        let (engine, source) = engine(FakeSource {
            fact: Some("Honey never spoils.".to_string()),
            articles: Some(vec![Article {
                title: "Light measured again".to_string(),
                link: "https://news/2".to_string(),
                published: "today".to_string(),
                source: "Physics Daily".to_string(),
            }]),
            tracks: Some(vec![queen_track()]),
            ..Default::default()
        });
        let selected = names(&["Model B", "Model C", "Model D", "Model E"]);

        let events = collect_staged(&engine, "speed of light", selected).await;

        let science = "The speed of light in a vacuum is 299,792,458 metres per second.\n\n\
                       Source: Science table";
        let reviewed = format!("{}\n\n(Checked for obvious contradictions.)", science);
        let listing = "- Light measured again (Physics Daily)\n  https://news/2";
        let track = "- Bohemian Rhapsody — Queen (A Night at the Opera)\n  https://store/1";
        let top_headlines = format!("Top headlines:\n{}", listing);
        let curated = format!("Curated headlines:\n{}", listing);
        let top_tracks = format!("Top tracks:\n{}", track);
        let playlist = format!("Playlist suggestion:\n{}", track);

        assert_eq!(
            updates(&events),
            vec![
                ("Model B", OutputField::InitialOutput, science),
                ("Model C", OutputField::InitialOutput, "Honey never spoils."),
                ("Model D", OutputField::InitialOutput, top_headlines.as_str()),
                ("Model E", OutputField::InitialOutput, top_tracks.as_str()),
                ("Model B", OutputField::FinalOutput, reviewed.as_str()),
                ("Model C", OutputField::FinalOutput, "Honey never spoils."),
                ("Model D", OutputField::FinalOutput, curated.as_str()),
                ("Model E", OutputField::FinalOutput, playlist.as_str()),
            ]
        );

        let calls = source.calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("news:")).count(), 1);
        assert!(calls.contains(&"music:speed of light:1".to_string()));
        assert!(calls.contains(&"music:speed of light:5".to_string()));
    }

    #[tokio::test]
    async fn test_staged_fact_placeholder_fills_both_phases() {
        let (engine, _) = engine(FakeSource::default());

        let events = collect_staged(&engine, "anything", names(&["Model C"])).await;

        assert_eq!(
            updates(&events),
            vec![
                ("Model C", OutputField::InitialOutput, "No fact available."),
                ("Model C", OutputField::FinalOutput, "No fact available."),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_survives_deeply_nested_query() {
        let (engine, _) = engine(FakeSource::default());
        let query = format!("{}1", "-".repeat(50_000));

        let response = engine.run(&query, &names(&["Model A"])).await;

        assert_eq!(
            response.models[0].final_output.as_deref(),
            Some("Could not compute a numeric result.")
        );
    }

    #[tokio::test]
    async fn test_staged_unknown_models_only() {
        let (engine, _) = engine(FakeSource::default());

        let events = collect_staged(&engine, "hello", names(&["Model Z"])).await;

        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            StreamEvent::timeline("Assigned tasks to selected models", "Model Z")
        );
        assert_eq!(
            events[3],
            StreamEvent::Final {
                models: vec![],
                synthesized_insight: "Final combined answer: ".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_staged_stops_when_receiver_dropped() {
        let (engine, source) = engine(FakeSource::default());
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        engine
            .run_staged("q", names(&["Model D"]), &StreamConfig::immediate(), tx)
            .await;

        assert!(source.calls().is_empty());
    }
}
