use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::alliance_selections;
use crate::gateway::events::AlliancePick;

/// Persisted captain/pick row, one per alliance number.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, AsChangeset, Serialize, ToSchema)]
#[diesel(table_name = alliance_selections)]
pub struct AllianceSelection {
    pub alliance_number: i32,
    pub alliance_captain: String,
    pub alliance_selection: String,
}

impl From<AllianceSelection> for AlliancePick {
    fn from(row: AllianceSelection) -> Self {
        Self {
            alliance_number: row.alliance_number,
            alliance_captain: row.alliance_captain,
            alliance_selection: row.alliance_selection,
        }
    }
}

impl From<AlliancePick> for AllianceSelection {
    fn from(pick: AlliancePick) -> Self {
        Self {
            alliance_number: pick.alliance_number,
            alliance_captain: pick.alliance_captain,
            alliance_selection: pick.alliance_selection,
        }
    }
}
