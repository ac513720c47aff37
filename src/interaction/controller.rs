use super::{
    CameraNavigator, GestureStrategy, Key, NavigationMode, Picker, PointerButton, PointerEvent,
    Response,
};

/// Routes input to the active tool and hands unclaimed drags to the camera.
///
/// A press the strategy ignores starts camera navigation; every following
/// move goes to the navigator until that button is released.
#[derive(Debug)]
pub struct InteractionController<N> {
    navigator: N,
    navigating: Option<(NavigationMode, PointerButton)>,
}

impl<N: CameraNavigator> InteractionController<N> {
    /// Creates a controller with no camera drag in progress.
    #[must_use]
    pub fn new(navigator: N) -> Self {
        Self {
            navigator,
            navigating: None,
        }
    }

    /// The camera navigator.
    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Current navigation mode, if a camera drag is in progress.
    #[must_use]
    pub fn navigation(&self) -> Option<NavigationMode> {
        self.navigating.map(|(mode, _)| mode)
    }

    /// Dispatches a pointer event.
    pub fn dispatch(
        &mut self,
        strategy: &mut dyn GestureStrategy,
        picker: &dyn Picker,
        event: &PointerEvent,
    ) -> Response {
        if let Some((_, held)) = self.navigating {
            match *event {
                PointerEvent::Moved { position } => {
                    self.navigator.update(position);
                }
                PointerEvent::Released { button, .. } if button == held => {
                    self.navigator.end();
                    self.navigating = None;
                }
                _ => {}
            }
            return Response::Consumed;
        }

        let response = strategy.pointer(event, picker);
        if let (true, PointerEvent::Pressed { button, position }) = (response.is_ignored(), *event)
        {
            let mode = NavigationMode::for_button(button);
            tracing::trace!(?mode, "camera navigation");
            self.navigator.begin(mode, position);
            self.navigating = Some((mode, button));
            return Response::Consumed;
        }
        response
    }

    /// Dispatches a key press.
    pub fn key(&mut self, strategy: &mut dyn GestureStrategy, key: Key) -> Response {
        strategy.key(key)
    }
}
