// mediafocus state managers
// Managers own the coordination state: the coordinator, per-tab agents, and
// the bookkeeping sets they maintain.

pub mod coordinator;
pub mod group_members;
pub mod paused_tabs;
pub mod tab_agent;
