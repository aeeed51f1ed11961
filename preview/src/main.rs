//! Desktop preview for myrtio-tapper
//!
//! Runs the real control loop on a worker thread against a simulated board
//! and simulated servo arms. Keys are mapped through `Command::from_key`,
//! so the preview is driven with the same layout as a real rig.

mod sim;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use eframe::egui;
use myrtio_tapper::{
    Command, CommandChannel, ControlLoop, SafetyMode, SamplePoint, TargetSet, TargetSlot,
};

use crate::sim::{BOUNDS, Board, LANES, Phase, SharedBoard, SimDelay, SimSource, lock};

/// Command channel size
const COMMAND_QUEUE_SIZE: usize = 16;

/// Static command channel between the UI and the control loop
static COMMANDS: CommandChannel<COMMAND_QUEUE_SIZE> = CommandChannel::new();

/// Size of one frame pixel on screen
const PIXEL_SCALE: f32 = 5.0;

/// Half length of a target crosshair, in frame pixels
const CROSSHAIR: f32 = 3.0;

const KEY_HELP: &str = "s safety  n next target  i/j/k/l move  1/2/3 tap white/red/blue  \
                        +/- angle  g/b tap time  5/t recovery  c/v cooldown  ? self-test  \
                        p print  q quit";

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_title("Tapper Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "myrtio-tapper-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

type Outcome = Arc<Mutex<Option<String>>>;

/// Build and run the machine until it stops, then store a summary
fn spawn_machine(board: SharedBoard, running: Arc<AtomicBool>, outcome: Outcome) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let config = sim::config();
        let machine = ControlLoop::new(
            SimSource::new(&board, &running),
            sim::lines(&board),
            SimDelay::new(&board),
            COMMANDS.receiver(),
            &config,
        );
        let text = match machine {
            Ok(machine) => match machine.run() {
                Ok(summary) => format!(
                    "stopped ({:?}) after {} sequences\n{}",
                    summary.stop, summary.fired, summary.report
                ),
                Err(err) => format!("stopped on driver failure: {err}"),
            },
            Err(err) => format!("startup failed: {err}"),
        };
        log::info!("{text}");
        *outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(text);
    })
}

struct PreviewApp {
    board: SharedBoard,
    running: Arc<AtomicBool>,
    outcome: Outcome,
    worker: Option<JoinHandle<()>>,

    // Mirrors of loop state, updated from the commands the UI sent
    /// Sample points as the loop sees them
    targets: TargetSet<LANES>,
    mode: SafetyMode,

    /// Scratch buffer for the rendered board
    pixels: Vec<u8>,
    texture: Option<egui::TextureHandle>,
}

impl PreviewApp {
    fn new() -> Self {
        let board: SharedBoard = Arc::new(Mutex::new(Board::new()));
        let running = Arc::new(AtomicBool::new(true));
        let outcome = Outcome::default();
        let worker = spawn_machine(Arc::clone(&board), Arc::clone(&running), Arc::clone(&outcome));
        let config = sim::config();

        Self {
            board,
            running,
            outcome,
            worker: Some(worker),
            targets: TargetSet::new(&config.targets, config.bounds),
            mode: SafetyMode::Armed,
            pixels: Vec::new(),
            texture: None,
        }
    }

    /// Queue a command and mirror its effect on the local state
    fn send(&mut self, command: Command) {
        if COMMANDS.try_send(command).is_err() {
            log::warn!("command queue full, dropped {command:?}");
            return;
        }
        match command {
            Command::ToggleSafety => self.mode = self.mode.toggled(),
            Command::NextTarget => {
                self.targets.select_next();
            }
            Command::MoveTarget(direction) => {
                self.targets.move_selected(direction);
            }
            _ => {}
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let events = ctx.input(|input| input.events.clone());
        for event in events {
            match event {
                egui::Event::Text(text) => {
                    for command in text.chars().filter_map(Command::from_key) {
                        self.send(command);
                    }
                }
                egui::Event::Key {
                    key: egui::Key::Escape,
                    pressed: true,
                    ..
                } => self.send(Command::Quit),
                _ => {}
            }
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) -> egui::TextureId {
        lock(&self.board).render(&mut self.pixels);
        let image = egui::ColorImage::from_rgb(
            [usize::from(BOUNDS.width), usize::from(BOUNDS.height)],
            &self.pixels,
        );
        match &mut self.texture {
            Some(texture) => {
                texture.set(image, egui::TextureOptions::NEAREST);
                texture.id()
            }
            None => {
                let texture = ctx.load_texture("board", image, egui::TextureOptions::NEAREST);
                let id = texture.id();
                self.texture = Some(texture);
                id
            }
        }
    }

    fn draw_board(&self, ui: &mut egui::Ui, texture: egui::TextureId) {
        let size = egui::vec2(
            f32::from(BOUNDS.width) * PIXEL_SCALE,
            f32::from(BOUNDS.height) * PIXEL_SCALE,
        );
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;

        painter.image(
            texture,
            response.rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let center = |point: SamplePoint| {
            egui::pos2(
                origin.x + (f32::from(point.column) + 0.5) * PIXEL_SCALE,
                origin.y + (f32::from(point.row) + 0.5) * PIXEL_SCALE,
            )
        };
        let selected = self.targets.selected();
        let slots = self
            .targets
            .lanes()
            .iter()
            .enumerate()
            .map(|(index, point)| (TargetSlot::Lane(index), *point))
            .chain(core::iter::once((TargetSlot::Sentinel, self.targets.sentinel())));

        for (slot, point) in slots {
            let color = match slot {
                _ if slot == selected => egui::Color32::YELLOW,
                TargetSlot::Lane(_) => egui::Color32::GREEN,
                TargetSlot::Sentinel => egui::Color32::from_rgb(220, 0, 220),
            };
            let stroke = egui::Stroke::new(1.5, color);
            let c = center(point);
            let arm = CROSSHAIR * PIXEL_SCALE;
            painter.line_segment([c - egui::vec2(arm, 0.0), c + egui::vec2(arm, 0.0)], stroke);
            painter.line_segment([c - egui::vec2(0.0, arm), c + egui::vec2(0.0, arm)], stroke);
            if slot == selected {
                painter.circle_stroke(c, arm, stroke);
            }
        }
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        let board = lock(&self.board);
        ui.horizontal(|ui| {
            let mode = match self.mode {
                SafetyMode::Armed => "ARMED (safety on)",
                SafetyMode::Live => "LIVE",
            };
            ui.label(format!("Mode: {mode}"));
            ui.add_space(16.0);
            let phase = match board.phase() {
                Phase::Banner => "start banner",
                Phase::Showing => "showing",
                Phase::Transition => "transition",
            };
            ui.label(format!("Board: {phase}, lane {}/{LANES}", board.progress()));
            ui.add_space(16.0);
            ui.label(format!("Rounds: {}  Misses: {}", board.rounds(), board.misses()));
            ui.add_space(16.0);
            let clock = board.clock();
            ui.label(format!("Clock: {}.{:03}s", clock.as_secs(), clock.subsec_millis()));
        });

        ui.add_space(4.0);

        ui.horizontal(|ui| {
            for arm in board.arms() {
                let color = sim::button_color(arm.button);
                ui.colored_label(
                    egui::Color32::from_rgb(color.r, color.g, color.b),
                    format!(
                        "{} {:.1} deg{} ({} presses)",
                        arm.button,
                        arm.angle,
                        if arm.powered { "" } else { ", off" },
                        arm.presses
                    ),
                );
                ui.add_space(12.0);
            }
        });
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        let texture = self.upload_frame(ctx);

        // Request continuous repaint for animation
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_status(ui);
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.button("Toggle safety").clicked() {
                    self.send(Command::ToggleSafety);
                }
                if ui.button("Self-test").clicked() {
                    self.send(Command::SelfTest);
                }
                if ui.button("Restart board").clicked() {
                    lock(&self.board).restart();
                }
            });

            ui.add_space(8.0);
            self.draw_board(ui, texture);
            ui.add_space(8.0);
            ui.label(KEY_HELP);

            let outcome = self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(text) = outcome.as_ref() {
                ui.add_space(8.0);
                ui.monospace(text);
            }
        });
    }
}

impl Drop for PreviewApp {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        let _ = COMMANDS.try_send(Command::Quit);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
