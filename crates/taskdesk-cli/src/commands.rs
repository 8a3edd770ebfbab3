//! Subcommand handlers.
//!
//! Backend commands run against a [`TaskStore`]; token commands only touch
//! the [`TokenStore`]. Output goes to the given writer so handlers can be
//! exercised without a terminal.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use taskdesk_auth::TokenStore;
use taskdesk_core::{TASK_CATEGORIES, TaskId, TaskInput, paginate};
use taskdesk_store::TaskStore;

use crate::cli::Command;
use crate::render;

/// Run a command that needs no backend.
pub fn run_local(command: &Command, tokens: &dyn TokenStore, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Categories => {
            write!(out, "{}", render::categories(TASK_CATEGORIES))?;
        }
        Command::Login { token } => {
            tokens.set_token(token).context("failed to store token")?;
            writeln!(out, "Logged in.")?;
        }
        Command::Logout => {
            tokens.clear().context("failed to remove token")?;
            writeln!(out, "Logged out.")?;
        }
        other => return Err(anyhow!("{other:?} needs the backend")),
    }
    Ok(())
}

/// Run a backend command.
pub async fn run_remote(command: Command, store: &TaskStore, out: &mut impl Write) -> Result<()> {
    debug!(?command, "running command");
    match command {
        Command::List {
            category,
            page,
            per_page,
        } => {
            let tasks = store.fetch_tasks().await?;
            let shown = match &category {
                Some(c) => tasks.into_iter().filter(|t| &t.category == c).collect(),
                None => tasks,
            };
            let page = paginate(&shown, page, per_page);
            write!(out, "{}", render::page(&page, category.as_deref()))?;
        }
        Command::Show { id } => {
            let task = store
                .fetch_task(TaskId::new(id))
                .await?
                .ok_or_else(|| anyhow!("task #{id} not found"))?;
            write!(out, "{}", render::task_detail(&task))?;
        }
        Command::Add { title, category } => {
            let task = store
                .create_task(&TaskInput::new(title, category))
                .await?;
            writeln!(out, "Created {}", render::task_line(&task))?;
        }
        Command::Edit {
            id,
            title,
            category,
        } => {
            let id = TaskId::new(id);
            let input = match (title, category) {
                (Some(title), Some(category)) => TaskInput::new(title, category),
                (None, None) => return Err(anyhow!("nothing to change: pass --title and/or --category")),
                (title, category) => {
                    let current = store
                        .fetch_task(id)
                        .await?
                        .ok_or_else(|| anyhow!("task #{id} not found"))?;
                    TaskInput::new(
                        title.unwrap_or(current.title),
                        category.unwrap_or(current.category),
                    )
                }
            };
            let task = store.update_task(id, &input).await?;
            writeln!(out, "Updated {}", render::task_line(&task))?;
        }
        Command::Rm { id } => {
            let response = store.delete_task(TaskId::new(id)).await?;
            writeln!(out, "{}", response.message)?;
        }
        Command::Stats => {
            let _ = store.fetch_tasks().await?;
            write!(out, "{}", render::stats(&store.stats()))?;
        }
        other => return Err(anyhow!("{other:?} does not use the backend")),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskdesk_auth::{FileTokenStore, MemoryTokenStore};
    use taskdesk_client::{GatewayOp, InMemoryTaskGateway};
    use taskdesk_core::Task;
    use taskdesk_query::CacheConfig;
    use tempfile::TempDir;

    fn task(id: u64, title: &str, category: &str) -> Task {
        Task {
            id: TaskId::new(id),
            title: title.into(),
            category: category.into(),
            created_at: None,
            updated_at: None,
        }
    }

    fn setup(tasks: Vec<Task>) -> (Arc<InMemoryTaskGateway>, TaskStore) {
        let gateway = Arc::new(InMemoryTaskGateway::with_tasks(tasks));
        let store = TaskStore::new(gateway.clone(), CacheConfig::default());
        (gateway, store)
    }

    async fn run(store: &TaskStore, command: Command) -> Result<String> {
        let mut out = Vec::new();
        run_remote(command, store, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let (_gw, store) = setup(vec![
            task(1, "a", "work"),
            task(2, "b", "home"),
            task(3, "c", "work"),
        ]);
        let out = run(
            &store,
            Command::List {
                category: Some("work".into()),
                page: 1,
                per_page: 6,
            },
        )
        .await
        .unwrap();
        assert!(out.contains("Page 1 of 1 (2 tasks)"));
        assert!(!out.contains(" b"));
    }

    #[tokio::test]
    async fn add_trims_and_reports() {
        let (gw, store) = setup(vec![]);
        let out = run(
            &store,
            Command::Add {
                title: "  Pay rent ".into(),
                category: "finance".into(),
            },
        )
        .await
        .unwrap();
        assert!(out.starts_with("Created #1"));
        assert_eq!(gw.tasks()[0].title, "Pay rent");
    }

    #[tokio::test]
    async fn add_blank_title_fails_without_request() {
        let (gw, store) = setup(vec![]);
        let err = run(
            &store,
            Command::Add {
                title: "   ".into(),
                category: "work".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("title"));
        assert_eq!(gw.calls(GatewayOp::Create), 0);
    }

    #[tokio::test]
    async fn edit_keeps_unspecified_fields() {
        let (gw, store) = setup(vec![task(1, "old", "work")]);
        let _ = run(
            &store,
            Command::Edit {
                id: 1,
                title: Some("new".into()),
                category: None,
            },
        )
        .await
        .unwrap();
        let stored = &gw.tasks()[0];
        assert_eq!(stored.title, "new");
        assert_eq!(stored.category, "work");
    }

    #[tokio::test]
    async fn edit_without_changes_is_an_error() {
        let (gw, store) = setup(vec![task(1, "old", "work")]);
        let result = run(
            &store,
            Command::Edit {
                id: 1,
                title: None,
                category: None,
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(gw.calls(GatewayOp::GetById), 0);
    }

    #[tokio::test]
    async fn show_missing_task_reports_not_found() {
        let (_gw, store) = setup(vec![]);
        let err = run(&store, Command::Show { id: 7 }).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn rm_prints_confirmation() {
        let (gw, store) = setup(vec![task(1, "a", "work")]);
        let out = run(&store, Command::Rm { id: 1 }).await.unwrap();
        assert_eq!(out, "Task deleted successfully\n");
        assert!(gw.tasks().is_empty());
    }

    #[tokio::test]
    async fn stats_reports_totals() {
        let (_gw, store) = setup(vec![task(1, "a", "work"), task(2, "b", "work")]);
        let out = run(&store, Command::Stats).await.unwrap();
        assert!(out.contains("Total tasks:  2"));
    }

    #[test]
    fn login_and_logout_use_token_file() {
        let dir = TempDir::new().unwrap();
        let tokens = FileTokenStore::new(dir.path().join("token.json"));
        let mut out = Vec::new();

        run_local(&Command::Login { token: "abc".into() }, &tokens, &mut out).unwrap();
        assert_eq!(tokens.token().as_deref(), Some("abc"));

        run_local(&Command::Logout, &tokens, &mut out).unwrap();
        assert!(tokens.token().is_none());
        assert_eq!(String::from_utf8(out).unwrap(), "Logged in.\nLogged out.\n");
    }

    #[test]
    fn login_rejects_blank_token() {
        let tokens = MemoryTokenStore::new();
        let mut out = Vec::new();
        assert!(run_local(&Command::Login { token: " ".into() }, &tokens, &mut out).is_err());
    }

    #[test]
    fn categories_needs_no_backend() {
        let tokens = MemoryTokenStore::new();
        let mut out = Vec::new();
        run_local(&Command::Categories, &tokens, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Entertainment"));
    }
}
