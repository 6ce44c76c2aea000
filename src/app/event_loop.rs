use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;
use tracing::info;

use crate::app::{App, Message, Model, update};
use crate::suggest::Phase;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Fires once after the author stops typing for `delay_ms`.
pub(super) struct IdleDebouncer {
    delay_ms: u64,
    last_edit: Option<u64>,
}

impl IdleDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            last_edit: None,
        }
    }

    pub(super) const fn touch(&mut self, now_ms: u64) {
        self.last_edit = Some(now_ms);
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(edited_at) = self.last_edit else {
            return false;
        };
        if now_ms.saturating_sub(edited_at) >= self.delay_ms {
            self.last_edit = None;
            true
        } else {
            false
        }
    }

    pub(super) const fn cancel(&mut self) {
        self.last_edit = None;
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }
}

impl App {
    /// Run the editor until the author quits. Returns the final draft.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(self) -> Result<String> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; inkling requires an interactive terminal")?;
        let size = terminal.size()?;

        let idle_ms = self.idle_ms;
        let mut model = self.into_model((size.width, size.height));
        info!(file = ?model.file_path, auto_suggest = model.auto_suggest, "editor started");

        let result = Self::event_loop(&mut terminal, &mut model, idle_ms);

        ratatui::restore();
        model.session.unmount();
        result?;
        Ok(model.session.current_text())
    }

    fn update_idle_debouncer(model: &Model, msg: &Message, now_ms: u64, idle: &mut IdleDebouncer) {
        if !model.auto_suggest {
            return;
        }
        if msg.is_edit() {
            idle.touch(now_ms);
        } else if matches!(msg, Message::RequestSuggestion | Message::Quit) {
            idle.cancel();
        }
    }

    fn dispatch(model: &mut Model, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, &side_msg);
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model, idle_ms: u64) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut idle_debouncer = IdleDebouncer::new(idle_ms);
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            for outcome in model.session.poll() {
                Self::dispatch(model, Message::Generation(outcome));
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                Self::dispatch(model, Message::Resize(width, height));
                needs_render = true;
            }

            if idle_debouncer.take_ready(now_ms) {
                Self::dispatch(model, Message::AutoSuggest);
                needs_render = true;
            }

            let waiting = model.session.phase() == Phase::Generating
                || model.session.personalizing().is_some();
            let poll_ms = if needs_render {
                0
            } else if waiting || resize_debouncer.is_pending() || idle_debouncer.is_pending() {
                20
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so debouncers use accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    Self::update_idle_debouncer(model, &msg, event_ms, &mut idle_debouncer);
                    Self::dispatch(model, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts and pastes into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        Self::update_idle_debouncer(model, &msg, drain_ms, &mut idle_debouncer);
                        Self::dispatch(model, msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
