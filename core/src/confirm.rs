//! User confirmation before destructive operations.

use std::future::Future;

/// Answers a yes/no prompt. A UI shows a dialog; tests answer directly.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> impl Future<Output = bool> + Send;
}

/// Plain closures answer synchronously.
impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> impl Future<Output = bool> + Send {
        std::future::ready(self(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_sees_the_prompt() {
        let only_todos = |prompt: &str| prompt.contains("todo");
        assert!(only_todos.confirm("delete this todo?").await);
        assert!(!only_todos.confirm("format disk?").await);
    }
}
