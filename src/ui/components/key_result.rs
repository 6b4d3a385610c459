/// Outcome of offering a key to a component.
///
/// Components return this to the view that owns them; the view falls
/// through to its own bindings on `NotHandled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, nothing for the parent to do
  Handled,
  /// Key was consumed and produced an event for the parent
  Event(T),
  /// Key was not consumed
  NotHandled,
}
