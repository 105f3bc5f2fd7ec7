use std::time::Duration;

use iced::border::Border;
use iced::widget::{button, mouse_area};
use iced::{Color, Element, Length, Shadow, Theme, Vector};
use iced_anim::transition::Easing;
use iced_anim::AnimationBuilder;

const HOVER_DARKEN: f32 = 0.05;
const CORNER_RADIUS: f32 = 10.0;
const SHADOW_BLUR_BASE: f32 = 10.0;
const SHADOW_BLUR_HOVER: f32 = 15.0;
const SHADOW_ALPHA_BASE: f32 = 0.25;
const SHADOW_ALPHA_HOVER: f32 = 0.35;
const ANIMATION_DURATION: Duration = Duration::from_millis(200);

/// Primary action button with an animated hover emphasis.
///
/// `on_press: None` renders the disabled state (no hover animation, no
/// press events).
pub fn primary_button<'a, Message: Clone + 'a>(
    content: impl Fn() -> Element<'a, Message> + 'a,
    on_press: Option<Message>,
    hovered: bool,
    on_hover: impl Fn(bool) -> Message + 'a,
    padding: [u16; 2],
    width: Length,
) -> Element<'a, Message> {
    let target = if hovered && on_press.is_some() {
        1.0_f32
    } else {
        0.0
    };

    let animated: Element<'a, Message> = AnimationBuilder::new(target, move |t: f32| {
        let t = t.clamp(0.0, 1.0);
        build_button(&content, on_press.clone(), padding, width, t)
    })
    .animates_layout(true)
    .animation(Easing::EASE_OUT.with_duration(ANIMATION_DURATION))
    .into();

    mouse_area(animated)
        .on_enter(on_hover(true))
        .on_exit(on_hover(false))
        .into()
}

fn build_button<'a, Message: Clone + 'a>(
    content: &(impl Fn() -> Element<'a, Message> + 'a),
    on_press: Option<Message>,
    padding: [u16; 2],
    width: Length,
    t: f32,
) -> Element<'a, Message> {
    let enabled = on_press.is_some();

    let mut btn = button(content())
        .padding(padding)
        .width(width)
        .style(move |theme: &Theme, _status| {
            let palette = theme.extended_palette();
            let base = palette.primary.base.color;
            let background = if enabled {
                Color {
                    r: (base.r - HOVER_DARKEN * t).max(0.0),
                    g: (base.g - HOVER_DARKEN * t).max(0.0),
                    b: (base.b - HOVER_DARKEN * t).max(0.0),
                    a: base.a,
                }
            } else {
                Color { a: 0.35, ..base }
            };

            button::Style {
                background: Some(iced::Background::Color(background)),
                text_color: Color::WHITE,
                border: Border {
                    radius: CORNER_RADIUS.into(),
                    ..Border::default()
                },
                shadow: Shadow {
                    color: Color {
                        a: SHADOW_ALPHA_BASE + (SHADOW_ALPHA_HOVER - SHADOW_ALPHA_BASE) * t,
                        ..base
                    },
                    offset: Vector::new(0.0, 3.0),
                    blur_radius: SHADOW_BLUR_BASE + (SHADOW_BLUR_HOVER - SHADOW_BLUR_BASE) * t,
                },
                ..button::Style::default()
            }
        });

    if let Some(message) = on_press {
        btn = btn.on_press(message);
    }

    btn.into()
}
