//! Screen routing

use tokio::sync::mpsc::UnboundedSender;

/// Screens a front end can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Login,
    SignUp,
    Chat,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::SignUp => "/signup",
            Route::Chat => "/",
        }
    }
}

/// Receives navigation requests from the views.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl Navigator for UnboundedSender<Route> {
    fn navigate(&self, route: Route) {
        tracing::debug!("Navigating to {}", route.path());
        if self.send(route).is_err() {
            tracing::warn!("Navigation to {} dropped, router is gone", route.path());
        }
    }
}
