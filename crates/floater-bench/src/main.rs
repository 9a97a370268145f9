use std::io;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use floater_wm::canvas::WindowCanvas;
use floater_wm::config::FloaterConfig;
use floater_wm::drivers::OutputDriver;
use floater_wm::drivers::headless::HeadlessOutputDriver;
use floater_wm::floater::handles::{Corner, HandleKind};
use floater_wm::floater::{FloaterId, FloaterParams};
use floater_wm::geometry::Point;
use floater_wm::input::PointerEvent;
use floater_wm::render::{OpenStepDecorator, render_canvas};

const CANVAS_WIDTH: i32 = 1600;
const CANVAS_HEIGHT: i32 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Workload {
    /// Title drags with snapping against the screen and siblings.
    Drag,
    /// Corner resizes with edge snapping.
    Resize,
    /// Open and close cascaded floaters.
    Cascade,
    /// Full frames: tick the canvas and paint it into an offscreen buffer.
    Render,
    All,
}

#[derive(Parser, Debug)]
#[command(
    name = "floater-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless throughput benchmark for the floater canvas"
)]
struct BenchCli {
    /// How long to run each workload.
    #[arg(
        short = 'd',
        long = "duration",
        value_name = "SECONDS",
        default_value_t = 2.0
    )]
    duration_seconds: f64,

    /// Floaters on the canvas while the workload runs.
    #[arg(short = 'n', long = "windows", value_name = "COUNT", default_value_t = 24)]
    windows: usize,

    #[arg(short = 'w', long = "workload", value_enum, default_value_t = Workload::All)]
    workload: Workload,
}

struct BenchConfig {
    duration: Duration,
    windows: usize,
    workloads: Vec<Workload>,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(0.1..=600.0).contains(&cli.duration_seconds) {
            return Err("duration must be between 0.1 and 600 seconds".to_string());
        }
        if !(1..=2_000).contains(&cli.windows) {
            return Err("windows must be between 1 and 2000".to_string());
        }
        let workloads = match cli.workload {
            Workload::All => vec![
                Workload::Drag,
                Workload::Resize,
                Workload::Cascade,
                Workload::Render,
            ],
            one => vec![one],
        };
        Ok(Self {
            duration: Duration::from_secs_f64(cli.duration_seconds),
            windows: cli.windows,
            workloads,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    for workload in &config.workloads {
        let stats = run_workload(*workload, &config)?;
        println!("{}", stats.final_report(*workload));
    }
    Ok(())
}

fn run_workload(workload: Workload, config: &BenchConfig) -> io::Result<BenchStats> {
    let mut canvas = populated_canvas(config.windows);
    let mut rng = Lcg::new(0x5EED_F1A7);
    let mut output = HeadlessOutputDriver::new(CANVAS_WIDTH as u16 / 8, CANVAS_HEIGHT as u16 / 16)?;
    let mut stats = BenchStats::new();

    while stats.elapsed() < config.duration {
        let started = Instant::now();
        let ops = match workload {
            Workload::Drag => drag_once(&mut canvas, &mut rng),
            Workload::Resize => resize_once(&mut canvas, &mut rng),
            Workload::Cascade => cascade_once(&mut canvas),
            Workload::Render => render_once(&mut canvas, &mut output)?,
            Workload::All => 0,
        };
        stats.record(ops, started.elapsed());
    }
    stats.mark_completed();
    Ok(stats)
}

fn populated_canvas(windows: usize) -> WindowCanvas {
    let mut canvas = WindowCanvas::new(FloaterConfig::default(), CANVAS_WIDTH, CANVAS_HEIGHT);
    for i in 0..windows {
        let id = canvas.create_floater(FloaterParams::new(format!("bench {i}")));
        canvas.open_floater(id);
    }
    canvas
}

/// Drags the frontmost floater along a jittery path through its title bar.
/// Returns the number of pointer samples fed.
fn drag_once(canvas: &mut WindowCanvas, rng: &mut Lcg) -> u64 {
    let Some(id) = canvas.frontmost() else {
        return 0;
    };
    let Some(rect) = canvas.floater(id).map(|f| f.rect()) else {
        return 0;
    };
    let mut pointer = Point::new(rect.left + rect.width() / 3, rect.top + 4);
    if !canvas.handle_pointer(PointerEvent::down(pointer.x, pointer.y)) {
        return 0;
    }
    let mut samples = 1;
    let heading = Point::new(rng.signed(12), rng.signed(12));
    for _ in 0..32 {
        pointer.x += heading.x + rng.signed(3);
        pointer.y += heading.y + rng.signed(3);
        canvas.handle_pointer(PointerEvent::drag(pointer.x, pointer.y));
        samples += 1;
    }
    canvas.handle_pointer(PointerEvent::up(pointer.x, pointer.y));
    // Rotate so every floater takes a turn at the front.
    if let Some(back) = canvas.backmost() {
        canvas.bring_to_front(back, true);
    }
    samples + 1
}

fn resize_once(canvas: &mut WindowCanvas, rng: &mut Lcg) -> u64 {
    let Some(id) = canvas.frontmost() else {
        return 0;
    };
    let Some(rect) = canvas.floater(id).map(|f| f.rect()) else {
        return 0;
    };
    let mut pointer = Point::new(rect.right - 1, rect.bottom - 1);
    if !canvas.begin_drag(id, HandleKind::Corner(Corner::RightBottom), pointer) {
        return 0;
    }
    let mut samples = 0;
    for _ in 0..32 {
        pointer.x += rng.signed(6);
        pointer.y += rng.signed(6);
        canvas.drag_to(pointer);
        samples += 1;
    }
    canvas.end_drag();
    if let Some(back) = canvas.backmost() {
        canvas.bring_to_front(back, true);
    }
    samples
}

/// Opens a burst of floaters at cascade positions, then closes them.
fn cascade_once(canvas: &mut WindowCanvas) -> u64 {
    let mut opened: Vec<FloaterId> = Vec::with_capacity(16);
    for i in 0..16 {
        let id = canvas.create_floater(FloaterParams::new(format!("cascade {i}")));
        canvas.open_floater(id);
        opened.push(id);
    }
    for id in opened {
        canvas.close_floater(id);
    }
    32
}

fn render_once(canvas: &mut WindowCanvas, output: &mut HeadlessOutputDriver) -> io::Result<u64> {
    let list = canvas.draw_tick();
    output.draw(|mut frame| render_canvas(&mut frame, &list, &OpenStepDecorator, &mut ()))?;
    Ok(1)
}

/// Deterministic jitter so runs are comparable.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform-ish value in `-span..=span`.
    fn signed(&mut self, span: i32) -> i32 {
        let width = (2 * span + 1) as u32;
        (self.next() % width) as i32 - span
    }
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    iterations: u64,
    ops: u64,
    fastest: Duration,
    slowest: Duration,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            iterations: 0,
            ops: 0,
            fastest: Duration::MAX,
            slowest: Duration::ZERO,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record(&mut self, ops: u64, took: Duration) {
        self.iterations = self.iterations.saturating_add(1);
        self.ops = self.ops.saturating_add(ops);
        self.fastest = self.fastest.min(took);
        self.slowest = self.slowest.max(took);
    }

    fn ops_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.ops as f64 / elapsed
        } else {
            0.0
        }
    }

    fn millis(duration: Duration, iterations: u64) -> f64 {
        if iterations == 0 {
            return 0.0;
        }
        duration.as_secs_f64() * 1_000.0
    }


    fn final_report(&self, workload: Workload) -> String {
        indoc::formatdoc!(
            r#"
            {workload:?} workload finished.
            Duration: {elapsed:.2}s | Iterations: {iterations}
            Operations: {ops} (~{ops_per_sec:.0}/s)
            Iteration ms best {best:.3} | worst {worst:.3}
            "#,
            workload = workload,
            elapsed = self.elapsed().as_secs_f64(),
            iterations = self.iterations,
            ops = self.ops,
            ops_per_sec = self.ops_per_second(),
            best = Self::millis(self.fastest, self.iterations),
            worst = Self::millis(self.slowest, self.iterations),
        )
    }
}
