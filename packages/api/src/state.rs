// ABOUTME: Shared application state handed to every handler
// ABOUTME: Holds the task and user services and the token manager

use std::sync::Arc;

use todo_auth::TokenManager;
use todo_tasks::TaskService;
use todo_users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub users: UserService,
    pub tokens: Arc<TokenManager>,
}

impl AppState {
    pub fn new(tasks: TaskService, users: UserService, tokens: Arc<TokenManager>) -> Self {
        Self {
            tasks,
            users,
            tokens,
        }
    }
}
