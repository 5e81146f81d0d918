//! Savings goals and how close the owner is to reaching them.

mod db;
mod endpoints;

pub use db::{
    Goal, GoalForm, GoalId, create_goal, create_goal_table, delete_goal, list_goals, update_goal,
};
pub use endpoints::{
    create_goal_endpoint, delete_goal_endpoint, list_goals_endpoint, update_goal_endpoint,
};
