//! Text input host for headless runs: keeps the state a real input would show and logs it.

use inkroom_core::{OverlayError, OverlayLayout, TextInputHost};

#[derive(Debug, Default)]
pub struct LoggingTextHost {
    visible: bool,
    layout: Option<OverlayLayout>,
    text: String,
}

impl LoggingTextHost {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn layout(&self) -> Option<&OverlayLayout> {
        self.layout.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TextInputHost for LoggingTextHost {
    fn open(&mut self, layout: &OverlayLayout, text: &str) -> Result<(), OverlayError> {
        log::debug!(
            "text input at ({:.1}, {:.1}) {:.0}x{:.0}",
            layout.position.x,
            layout.position.y,
            layout.width,
            layout.height
        );
        self.visible = true;
        self.layout = Some(layout.clone());
        self.text = text.to_string();
        Ok(())
    }

    fn update(&mut self, layout: &OverlayLayout, text: &str) -> Result<(), OverlayError> {
        if !self.visible {
            return Err(OverlayError::Host("update on a closed text input".into()));
        }
        self.layout = Some(layout.clone());
        self.text = text.to_string();
        Ok(())
    }

    fn close(&mut self) -> Result<(), OverlayError> {
        log::debug!("text input closed");
        self.visible = false;
        self.layout = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use inkroom_core::SerializableColor;

    fn layout() -> OverlayLayout {
        OverlayLayout {
            position: Point::new(1.0, 2.0),
            width: 200.0,
            height: 28.0,
            font_size: 20.0,
            bold: false,
            italic: false,
            color: SerializableColor::black(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut host = LoggingTextHost::default();
        assert!(host.update(&layout(), "x").is_err());
        host.open(&layout(), "ab").unwrap();
        assert!(host.is_visible());
        host.update(&layout(), "abc").unwrap();
        assert_eq!(host.text(), "abc");
        host.close().unwrap();
        assert!(!host.is_visible());
        assert!(host.layout().is_none());
    }
}
