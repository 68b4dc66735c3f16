/// Speech-synthesis capability handed to the shim by the host.
///
/// A thin façade over whatever speech service the host has: one process-wide
/// handle, owned by the host's lifecycle. Every operation is valid to call
/// at any time; when the backing service failed to initialize or has been
/// shut down, operations report failure instead of panicking, and the shim
/// carries on without speech.
///
/// The "is speaking" state may be maintained from a background thread of the
/// backing service; implementations must confine that to a single atomic
/// flag so that callers on the event-loop thread can poll it freely.
pub trait SpeechSynth {
    /// Flush anything queued and speak `text`. Returns false if the service
    /// is unavailable or rejected the utterance.
    fn speak(&self, text: &str) -> bool;

    /// Cancel the current utterance, if any. Returns false if the service is
    /// unavailable.
    fn stop(&self) -> bool;

    /// Returns true while an utterance is being played back.
    fn is_speaking(&self) -> bool;

    /// Release the backing service. Further operations report unavailable.
    fn shutdown(&self);
}
