use aurora_canvas::agent::executor::{ExecContext, Executor};
use aurora_canvas::agent::scanner::scan;
use aurora_canvas::agent::speed::SpeedControl;
use aurora_canvas::draw::views::ViewMode;
use aurora_canvas::draw::CanvasModel;
use aurora_canvas::sound::NullSink;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

const OUTPUT: &str = "template_medium flower5 red53333orange53333yellow53333 ++!--@ larger_brush5222211110000 navy5313!313@313#";

fn bench_scan(c: &mut Criterion) {
    c.bench_function("scan_model_output", |b| b.iter(|| scan(black_box(OUTPUT))));
}

fn bench_execute(c: &mut Criterion) {
    let tokens = scan(OUTPUT);
    let mut canvas = CanvasModel::with_size(1880, 1040);
    let mut speed = SpeedControl::default();
    let mut view_mode = ViewMode::Normal;
    let mut template = None;
    let mut sound = NullSink;
    let mut rng = StdRng::seed_from_u64(1);
    let mut executor = Executor::new();
    c.bench_function("execute_cycle", |b| {
        b.iter(|| {
            executor.execute(
                black_box(&tokens),
                ExecContext {
                    canvas: &mut canvas,
                    speed: &mut speed,
                    view_mode: &mut view_mode,
                    template: &mut template,
                    sound: &mut sound,
                    rng: &mut rng,
                },
            )
        })
    });
}

criterion_group!(benches, bench_scan, bench_execute);
criterion_main!(benches);
