//! Income and expense categories, e.g. "Salary" or "Groceries".

mod db;
mod endpoints;

pub use db::{
    Category, CategoryForm, CategoryId, CategoryUpdateForm, create_category,
    create_category_table, deactivate_category, list_categories, update_category,
};
pub use endpoints::{
    create_category_endpoint, deactivate_category_endpoint, list_categories_endpoint,
    update_category_endpoint,
};
