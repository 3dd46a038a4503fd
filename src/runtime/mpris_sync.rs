use crate::audio::AudioOutput;
use crate::mpris::MprisHandle;
use crate::session::PlaybackSession;

/// Push the session's current track and transport state to MPRIS.
pub fn update_mpris<O: AudioOutput>(mpris: &MprisHandle, session: &PlaybackSession<O>) {
    mpris.set_track(session.current());
    mpris.set_playback(session.transport());
}
