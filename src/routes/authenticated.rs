use super::names;
use crate::models::{RouteDefinition, ViewId};

/// Authenticated Routes
///
/// Every record here is flagged `requires_auth`. Children inherit the gate
/// from their parent, so `/chats/:id` is protected through `/chats`.
///
/// Records with `props()` receive their path params as view props:
/// `ownerId` for the owner profile, `taskId` for task completion and results,
/// `id` for a single chat room.
pub fn authenticated_routes() -> Vec<RouteDefinition> {
    vec![
        RouteDefinition::view("/main-page", ViewId::MainPage)
            .named(names::MAIN_PAGE)
            .requires_auth(),
        RouteDefinition::view("/task/:id", ViewId::TaskDetails)
            .named("TaskDetails")
            .requires_auth(),
        // --- Profiles ---
        RouteDefinition::view("/profile", ViewId::ProfilePage)
            .named("ProfilePage")
            .requires_auth(),
        // Profile of a startup owner, opened from a startup card.
        RouteDefinition::view("/profile/:ownerId", ViewId::ProfilePage)
            .named("ProfileOwner")
            .props()
            .requires_auth(),
        // --- Startups ---
        RouteDefinition::view("/create-startup", ViewId::CreateStartup)
            .named("CreateStartup")
            .requires_auth(),
        RouteDefinition::view("/edit-startup/:id", ViewId::EditStartup)
            .named("EditStartup")
            .requires_auth(),
        // --- Tasks ---
        // Both creation paths share the one CreateTask view.
        RouteDefinition::view("/create-task", ViewId::CreateTask)
            .named("CreateTask")
            .requires_auth(),
        RouteDefinition::view("/create-task/:id", ViewId::CreateTask)
            .named("CreateTaskWithId")
            .requires_auth(),
        RouteDefinition::view("/edit-task/:id", ViewId::EditTask)
            .named("EditTask")
            .requires_auth(),
        RouteDefinition::view("/complete-task/:taskId", ViewId::CompleteTask)
            .named("CompleteTask")
            .props()
            .requires_auth(),
        RouteDefinition::view("/task-result/:taskId", ViewId::TaskResult)
            .named("TaskResult")
            .props()
            .requires_auth(),
        // --- Chats ---
        RouteDefinition::view("/chats", ViewId::Chats)
            .named("Chats")
            .requires_auth()
            .children(vec![
                RouteDefinition::view(":id", ViewId::ChatRoom)
                    .named("ChatRoom")
                    .props(),
            ]),
    ]
}
