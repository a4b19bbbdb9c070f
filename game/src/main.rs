use std::env;

use anyhow::Context;
use pixel_engine::{
    Application, Color, CreateContext, Engine, EngineConfig, EngineHandle, KeyCode, KeyEvent,
    KeyFilter, UpdateContext,
};

const BOX_SIZE: i32 = 60;
const SPEED: f64 = 180.0;

/// Bouncing box demo.
struct Demo {
    x: f64,
    y: f64,
    dx: f64,
    dy: f64,
}

impl Demo {
    fn new() -> Self {
        Self {
            x: 20.0,
            y: 20.0,
            dx: SPEED,
            dy: SPEED * 0.6,
        }
    }
}

impl Application for Demo {
    fn on_create(&mut self, ctx: &mut CreateContext<'_>) -> anyhow::Result<()> {
        ctx.fill(0, 0, ctx.height() as i32, ctx.width() as i32, Color::BLACK);

        ctx.add_key_typed_listener(['p', 'P'], |_: &KeyEvent, engine: &EngineHandle| {
            if engine.is_paused() {
                engine.unpause();
            } else {
                engine.pause();
            }
            Ok(())
        });
        ctx.add_key_typed_listener(['+', '='], |_: &KeyEvent, engine: &EngineHandle| {
            engine.set_max_fps(engine.max_fps().max(0.0) + 5.0);
            log::info!("max fps: {}", engine.max_fps());
            Ok(())
        });
        ctx.add_key_typed_listener('-', |_: &KeyEvent, engine: &EngineHandle| {
            engine.set_max_fps((engine.max_fps() - 5.0).max(1.0));
            log::info!("max fps: {}", engine.max_fps());
            Ok(())
        });
        ctx.add_key_pressed_listener(KeyCode::Escape, |_: &KeyEvent, engine: &EngineHandle| {
            engine.stop();
            Ok(())
        });
        ctx.add_key_released_listener(KeyFilter::Any, |event: &KeyEvent, _: &EngineHandle| {
            log::trace!("released {event:?}");
            Ok(())
        });
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut UpdateContext<'_>, elapsed: f64) -> anyhow::Result<()> {
        if elapsed > 0.0 {
            log::debug!("update called, fps: {:.1}", 1.0 / elapsed);
        }
        let (width, height) = (ctx.width() as f64, ctx.height() as f64);
        let size = BOX_SIZE as f64;

        self.x += self.dx * elapsed;
        self.y += self.dy * elapsed;
        if self.x <= 0.0 || self.x + size >= width {
            self.dx = -self.dx;
            self.x = self.x.clamp(0.0, (width - size).max(0.0));
        }
        if self.y <= 0.0 || self.y + size >= height {
            self.dy = -self.dy;
            self.y = self.y.clamp(0.0, (height - size).max(0.0));
        }

        let (x, y) = (self.x as i32, self.y as i32);
        let mut g = ctx.graphics();
        g.set_color(Color::BLACK)
            .fill_rect(0, 0, width as i32, height as i32)
            .set_color(Color::GRAY)
            .fill_rect(x + 4, y + 4, BOX_SIZE - 8, BOX_SIZE - 8)
            .set_color(Color::WHITE)
            .draw_rect(x, y, BOX_SIZE, BOX_SIZE)
            .set_color(Color::YELLOW)
            .draw_polygon(&[
                (x + BOX_SIZE / 2, y + 10),
                (x + BOX_SIZE - 10, y + BOX_SIZE - 10),
                (x + 10, y + BOX_SIZE - 10),
            ]);

        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    pixel_engine::init_logger("info");

    let path = env::args().nth(1).unwrap_or_else(|| "game.toml".to_string());
    let config = EngineConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config from {path}"))?;

    let engine = Engine::new(config, Demo::new()).context("failed to create engine")?;
    engine.start().context("engine terminated with an error")?;
    Ok(())
}
