/// Persistence hooks.
///
/// A persistence layer calls `commit`, `fetch`, and `destroy` on a record and
/// reports completion through the matching `did_*` hook. Every method is a
/// no-op by default; the record model defines no transport of its own.
pub trait Lifecycle {
    fn commit(&mut self) {}

    fn fetch(&mut self) {}

    fn destroy(&mut self) {}

    fn did_fetch(&mut self) {}

    fn did_commit(&mut self) {}

    fn did_destroy(&mut self) {}
}
