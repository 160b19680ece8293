use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    Step,
    Fire,
    Hit,
    Switch,
    Door,
    Death,
    Fanfare,
    Scroll,
    Select,
    Theme,
}

/// Fire-and-forget audio sink. Implementations swallow their own failures.
pub trait Audio {
    fn play(&mut self, sound: SoundId, delay_ticks: u32);
    fn start_loop(&mut self, sound: SoundId);
    fn stop(&mut self, sound: SoundId);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl Audio for NullAudio {
    fn play(&mut self, sound: SoundId, delay_ticks: u32) {
        trace!(sound = ?sound, delay_ticks, "audio_play");
    }

    fn start_loop(&mut self, sound: SoundId) {
        trace!(sound = ?sound, "audio_loop");
    }

    fn stop(&mut self, sound: SoundId) {
        trace!(sound = ?sound, "audio_stop");
    }
}

#[cfg(test)]
pub(crate) use recording::{AudioCall, RecordingAudio};

#[cfg(test)]
mod recording {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{Audio, SoundId};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum AudioCall {
        Play(SoundId),
        Loop(SoundId),
        Stop(SoundId),
    }

    /// Audio sink that shares its call log with the test that built it.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingAudio {
        calls: Rc<RefCell<Vec<AudioCall>>>,
    }

    impl RecordingAudio {
        pub(crate) fn calls(&self) -> Vec<AudioCall> {
            self.calls.borrow().clone()
        }
    }

    impl Audio for RecordingAudio {
        fn play(&mut self, sound: SoundId, _delay_ticks: u32) {
            self.calls.borrow_mut().push(AudioCall::Play(sound));
        }

        fn start_loop(&mut self, sound: SoundId) {
            self.calls.borrow_mut().push(AudioCall::Loop(sound));
        }

        fn stop(&mut self, sound: SoundId) {
            self.calls.borrow_mut().push(AudioCall::Stop(sound));
        }
    }
}
