pub mod redirect;
pub mod status_view;

pub use redirect::{
    classify, decide, next_step, ApprovalState, NextStep, RedirectDecision, UserRole,
};
pub use status_view::{map_to_view_model, ViewApplicationStatus, ViewApplicationStatusSignatory};
