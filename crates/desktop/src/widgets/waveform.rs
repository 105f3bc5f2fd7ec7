use iced::mouse;
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Path, Stroke};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Theme};

use crate::app::Message;

/// Live amplitude trace of the samples currently being captured.
///
/// Purely a rendering side effect: the samples are a snapshot taken on the
/// recording tick and nothing is retained once capture stops.
struct Waveform<'a> {
    samples: &'a [f32],
}

pub fn view(samples: &[f32]) -> Element<'_, Message> {
    Canvas::new(Waveform { samples })
        .width(Length::Fill)
        .height(96)
        .into()
}

impl canvas::Program<Message> for Waveform<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let width = frame.width();
        let mid = frame.height() / 2.0;
        let accent = theme.extended_palette().primary.base.color;

        if self.samples.is_empty() {
            frame.stroke(
                &Path::line(Point::new(0.0, mid), Point::new(width, mid)),
                Stroke::default()
                    .with_color(Color { a: 0.3, ..accent })
                    .with_width(1.0),
            );
            return vec![frame.into_geometry()];
        }

        let step = width / self.samples.len() as f32;
        let path = Path::new(|builder| {
            builder.move_to(Point::new(0.0, mid));
            for (i, sample) in self.samples.iter().enumerate() {
                let y = mid - sample.clamp(-1.0, 1.0) * mid;
                builder.line_to(Point::new(i as f32 * step, y));
            }
            builder.line_to(Point::new(width, mid));
        });
        frame.stroke(&path, Stroke::default().with_color(accent).with_width(2.0));

        vec![frame.into_geometry()]
    }
}
