pub trait TryResolveWithContext<'r> {
    type Context;
    type Resolved;
    type Error;

    fn try_resolve_with_context(self, context: Self::Context)
        -> Result<Self::Resolved, Self::Error>;
}
