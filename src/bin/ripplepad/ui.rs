//! Ripple field renderer: rings and sparks on a braille canvas.

use ratatui::{
    style::Color,
    symbols,
    widgets::{
        canvas::{Canvas, Circle, Points},
        Block, Borders,
    },
    Frame,
};

use ripplepad::mapping::Rgb;
use ripplepad::surface::MapperMode;
use ripplepad::visual::FieldFrame;

use super::app::{SURFACE_HEIGHT, SURFACE_WIDTH};

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

pub fn render(frame: &mut Frame, field: &FieldFrame, mode: MapperMode, audio_on: bool) {
    let mode_label = match mode {
        MapperMode::Scale => "scale",
        MapperMode::Grid => "grid",
    };
    let audio_label = if audio_on { "" } else { " [no audio]" };
    let title = format!(" ripplepad - {mode_label}{audio_label} - g: mode, q: quit ");

    let canvas = Canvas::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, SURFACE_WIDTH as f64])
        .y_bounds([0.0, SURFACE_HEIGHT as f64])
        .paint(|ctx| {
            for ring in &field.rings {
                ctx.draw(&Circle {
                    x: ring.x as f64,
                    // Canvas y grows upward; the surface's grows downward.
                    y: (SURFACE_HEIGHT - ring.y) as f64,
                    radius: ring.radius as f64,
                    color: to_color(ring.color.dimmed(ring.intensity)),
                });
            }

            ctx.layer();
            for spark in &field.sparks {
                let coords = [(spark.x as f64, (SURFACE_HEIGHT - spark.y) as f64)];
                ctx.draw(&Points {
                    coords: &coords,
                    color: to_color(spark.color.dimmed(spark.intensity)),
                });
            }
        });

    frame.render_widget(canvas, frame.area());
}
