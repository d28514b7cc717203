use prometheus::register_counter_vec;
use prometheus::CounterVec;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref QUIZ_QUESTIONS_CNTR: CounterVec = register_counter_vec!(
        "quiz_questions_served_total",
        "Number of questions handed out to quizzes",
        &["category"]
    )
    .expect("quiz counter registers once");
    pub static ref QUESTION_CHANGES_CNTR: CounterVec = register_counter_vec!(
        "question_changes_total",
        "Number of created and deleted questions",
        &["operation"]
    )
    .expect("question counter registers once");
}

const DEFAULT_LOG_LEVEL: &str = "info";

/// `INCLUDE_SPAN_EVENTS=true` logs span enter/exit, anything else logs none.
fn span_events(include: Option<&str>) -> FmtSpan {
    match include {
        Some(value) if value.eq_ignore_ascii_case("true") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::NONE,
    }
}

/// Installs the global subscriber. Level comes from `LOG_LEVEL` (an
/// `EnvFilter` directive), defaulting to `info`. A second call is a no-op.
pub fn init_tracing() {
    let include = std::env::var("INCLUDE_SPAN_EVENTS").ok();
    let fmt_layer = fmt::layer().with_span_events(span_events(include.as_deref()));
    let filter_layer = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing already initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_events_only_when_requested() {
        assert_eq!(span_events(Some("TRUE")), FmtSpan::ENTER | FmtSpan::EXIT);
        assert_eq!(span_events(Some("no")), FmtSpan::NONE);
        assert_eq!(span_events(None), FmtSpan::NONE);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_tracing();
        init_tracing();
    }
}
