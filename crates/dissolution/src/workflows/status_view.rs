use serde::Serialize;

use crate::api::DissolutionGetResponse;

/// One row of the signatory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewApplicationStatusSignatory {
    pub id: String,
    pub name: String,
    pub email: String,
    pub has_approved: bool,
    pub can_change: bool,
}

/// Signatory table shown on the status pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewApplicationStatus {
    pub signatories: Vec<ViewApplicationStatusSignatory>,
    pub show_change_column: bool,
}

/// Only the applicant may change a signatory, and only one who has not signed yet.
pub fn map_to_view_model(
    dissolution: &DissolutionGetResponse,
    is_applicant: bool,
) -> ViewApplicationStatus {
    let signatories: Vec<_> = dissolution
        .directors
        .iter()
        .map(|director| ViewApplicationStatusSignatory {
            id: director.officer_id.clone(),
            name: director.name.clone(),
            email: director.email.clone(),
            has_approved: director.has_approved(),
            can_change: is_applicant && !director.has_approved(),
        })
        .collect();

    let show_change_column = signatories.iter().any(|signatory| signatory.can_change);

    ViewApplicationStatus {
        signatories,
        show_change_column,
    }
}
