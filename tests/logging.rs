#[test]
fn init_is_idempotent() {
    aurora_canvas::logging::init(false);
    aurora_canvas::logging::init(true);
    tracing::info!("still logging");
}
