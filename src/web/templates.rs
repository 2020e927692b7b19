use crate::catalog::AppDescriptor;
use askama::Template;

/// Signed-in part of the launcher page
pub struct Workspace {
    pub display_name: String,
    pub loading: bool,
    pub error: Option<String>,
    pub assigned: Vec<AppDescriptor>,
    pub unassigned: Vec<AppDescriptor>,
}

#[derive(Template)]
#[template(path = "launcher.html")]
pub struct LauncherTemplate {
    pub greeting: String,
    pub subtitle: String,
    /// Whole catalog, shown as locked tiles to visitors
    pub available: Vec<AppDescriptor>,
    /// Present when the visitor is signed in
    pub workspace: Option<Workspace>,
}
