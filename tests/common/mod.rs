pub mod tracing {
    use tracing_subscriber::fmt::format::FmtSpan;

    pub fn init_subscriber() {
        // Multiple tests of one binary try this. Only the first one succeeds.
        let _ = tracing_subscriber::fmt()
            .with_max_level(::tracing::Level::DEBUG)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .try_init();
    }
}
