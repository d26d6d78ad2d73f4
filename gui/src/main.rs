mod settings;

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use anyhow::Context;
use eframe::egui;
use eframe::egui::{ScrollArea, Ui};
use eframe::run_native;
use life_engine::{Engine, Grid, LifeLike};
use log::{debug, info, warn};

use crate::settings::Settings;

const CELL_SIZE: f32 = 8.0;

/// Simulation state shared between the window and the stepping thread.
struct Simulation {
    engine: Engine,
    rule: LifeLike,
    parallel: bool,
    running: bool,
}

impl Simulation {
    fn step(&mut self) {
        if self.parallel {
            self.engine.step_parallel(&self.rule);
        } else {
            self.engine.step(&self.rule);
        }
    }

    /// Replaces the world with an edited copy of it, starting the
    /// generation count again.
    fn reseed(&mut self, edit: impl FnOnce(&mut Grid)) {
        let mut grid = self.engine.current().clone();
        edit(&mut grid);
        if let Err(err) = self.engine.reset(&grid) {
            warn!("reseed failed: {err}");
        }
    }
}

/// Locks the shared state. A panic while the lock was held leaves the
/// engine between steps, so a poisoned lock is still usable.
fn lock(simulation: &Mutex<Simulation>) -> MutexGuard<'_, Simulation> {
    simulation.lock().unwrap_or_else(|poisoned| {
        warn!("simulation lock poisoned, continuing");
        poisoned.into_inner()
    })
}

fn build_engine(settings: &Settings) -> anyhow::Result<Engine> {
    let size = settings.world_size;
    let mut engine = match &settings.snapshot {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("read snapshot {}", path.display()))?;
            info!("loaded {} snapshot bytes from {}", bytes.len(), path.display());
            Engine::from_snapshot(size, &bytes)
                .with_context(|| format!("load snapshot {}", path.display()))?
        }
        None => Engine::new(size, None).context("create world")?,
    };
    if let Some(pattern) = settings.pattern {
        pattern
            .stamp_centered(engine.current_mut())
            .with_context(|| format!("place {} in a {size}x{size} world", pattern.name))?;
    }
    Ok(engine)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = Settings::parse();
    info!(
        "world {0}x{0}, rule {1}, one generation every {2:?}",
        settings.world_size, settings.rule, settings.interval
    );

    let engine = build_engine(&settings)?;
    let simulation = Arc::new(Mutex::new(Simulation {
        engine,
        rule: settings.rule,
        parallel: settings.parallel_step(),
        running: !settings.paused,
    }));
    let interval = settings.interval;
    let density = settings.density;

    run_native(
        "Game of Life GUI",
        eframe::NativeOptions::default(),
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let stepper = Arc::clone(&simulation);

            // The engine has no timer; this thread is its clock.
            thread::spawn(move || loop {
                thread::sleep(interval);
                let mut simulation = lock(&stepper);
                if simulation.running {
                    simulation.step();
                    ctx.request_repaint();
                }
            });

            Ok(Box::new(GuiOfLife::new(cc, simulation, density)))
        }),
    )
    .map_err(|err| anyhow::anyhow!("window failed: {err}"))
}

struct GuiOfLife {
    simulation: Arc<Mutex<Simulation>>,
    density: f64,
}

impl GuiOfLife {
    fn new(
        _cc: &eframe::CreationContext<'_>,
        simulation: Arc<Mutex<Simulation>>,
        density: f64,
    ) -> Self {
        Self {
            simulation,
            density,
        }
    }

    fn controls(&self, ui: &mut Ui) {
        let mut simulation = lock(&self.simulation);
        ui.horizontal(|ui| {
            let label = if simulation.running { "Pause" } else { "Resume" };
            if ui.button(label).clicked() {
                simulation.running = !simulation.running;
            }
            if ui
                .add_enabled(!simulation.running, egui::Button::new("Step"))
                .clicked()
            {
                simulation.step();
            }
            if ui.button("Randomize").clicked() {
                let density = self.density;
                simulation.reseed(|grid| grid.randomize(&mut rand::rng(), density));
            }
            if ui.button("Clear").clicked() {
                simulation.reseed(Grid::clear);
            }
            ui.label(format!(
                "generation {}, population {}",
                simulation.engine.generation(),
                simulation.engine.current().population()
            ));
        });
    }

    fn create_grid(&self, ui: &mut Ui) {
        let mut simulation = lock(&self.simulation);
        let grid = simulation.engine.current();
        let size = grid.size();

        let (rect, response) = ui.allocate_exact_size(
            egui::vec2(CELL_SIZE * size as f32, CELL_SIZE * size as f32),
            egui::Sense::click(),
        );

        // Cell (x, y) is drawn x cells right and y cells down.
        let painter = ui.painter();
        for (index, alive) in grid.iter().enumerate() {
            let (x, y) = (index / size, index % size);
            let pos = rect.min + egui::vec2(x as f32 * CELL_SIZE, y as f32 * CELL_SIZE);

            let color = if alive {
                egui::Color32::WHITE
            } else {
                egui::Color32::DARK_GRAY
            };

            painter.rect_filled(
                egui::Rect::from_min_size(pos, egui::vec2(CELL_SIZE, CELL_SIZE)),
                CELL_SIZE / 4f32,
                color,
            );
        }

        if let Some(pointer) = response.interact_pointer_pos().filter(|_| response.clicked()) {
            let offset = (pointer - rect.min) / CELL_SIZE;
            let (x, y) = (offset.x.floor() as i32, offset.y.floor() as i32);
            if let Err(err) = simulation.engine.current_mut().toggle(x, y) {
                debug!("click ignored: {err}");
            }
        }
    }
}

impl eframe::App for GuiOfLife {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::both().show(ui, |ui| {
                ui.heading("Game of Life");
                self.controls(ui);
                self.create_grid(ui);
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_engine::{conway, pattern};
    use std::path::PathBuf;

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("life-gui-{}-{name}", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn loads_snapshot_file() {
        let mut grid = Grid::new(5).unwrap();
        grid.set(4, 0, true).unwrap();
        let path = temp_file("ok.bin", &grid.to_snapshot());

        let settings = Settings {
            world_size: 5,
            snapshot: Some(path.clone()),
            ..Settings::default()
        };
        let engine = build_engine(&settings).unwrap();
        std::fs::remove_file(path).unwrap();

        assert_eq!(engine.current(), &grid);
    }

    #[test]
    fn reports_bad_snapshots() {
        let path = temp_file("short.bin", &[0xff]);
        let settings = Settings {
            world_size: 5,
            snapshot: Some(path.clone()),
            ..Settings::default()
        };
        let err = build_engine(&settings).unwrap_err();
        std::fs::remove_file(path).unwrap();
        assert!(matches!(
            err.downcast_ref::<life_engine::Error>(),
            Some(life_engine::Error::SnapshotSize { .. })
        ));

        let missing = Settings {
            snapshot: Some(PathBuf::from("/nonexistent/life.bin")),
            ..Settings::default()
        };
        assert!(build_engine(&missing).is_err());
    }

    #[test]
    fn places_pattern_in_the_middle() {
        let settings = Settings {
            world_size: 5,
            pattern: Some(&pattern::BLINKER),
            ..Settings::default()
        };
        let engine = build_engine(&settings).unwrap();
        assert_eq!(engine.current().population(), 3);
        assert!(engine.current().get(2, 2).unwrap());

        let cramped = Settings {
            world_size: 3,
            pattern: Some(&pattern::LWSS),
            ..Settings::default()
        };
        assert!(build_engine(&cramped).is_err());
    }

    #[test]
    fn reseeding_restarts_the_generation_count() {
        let mut engine = Engine::new(6, None).unwrap();
        pattern::BLINKER.stamp(engine.current_mut(), 1, 2).unwrap();
        let mut simulation = Simulation {
            engine,
            rule: LifeLike::CONWAY,
            parallel: false,
            running: false,
        };
        simulation.step();
        simulation.step();
        assert_eq!(simulation.engine.generation(), 2);

        simulation.reseed(|grid| grid.randomize(&mut rand::rng(), 1.0));
        assert_eq!(simulation.engine.generation(), 0);
        assert_eq!(simulation.engine.current().population(), 36);

        simulation.engine.step(&conway);
        simulation.reseed(Grid::clear);
        assert_eq!(simulation.engine.generation(), 0);
        assert!(simulation.engine.current().is_empty());
    }
}
