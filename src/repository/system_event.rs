use diesel::prelude::*;

use crate::domain::system_event::NewSystemEvent;
use crate::models::system_event::NewSystemEvent as DbNewSystemEvent;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, SystemEventWriter};

impl SystemEventWriter for DieselRepository {
    fn log_system_event(&self, event: &NewSystemEvent) -> RepositoryResult<usize> {
        use crate::schema::system_events;

        let mut conn = self.conn()?;
        let record: DbNewSystemEvent = event.try_into()?;

        let affected = diesel::insert_into(system_events::table)
            .values(&record)
            .execute(&mut conn)?;

        Ok(affected)
    }
}
