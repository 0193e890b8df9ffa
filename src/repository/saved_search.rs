use diesel::prelude::*;

use crate::domain::saved_search::{NewSavedSearch, SavedSearch};
use crate::domain::types::UserId;
use crate::models::saved_search::{
    NewSavedSearch as DbNewSavedSearch, SavedSearch as DbSavedSearch,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, SavedSearchReader, SavedSearchWriter};

impl SavedSearchReader for DieselRepository {
    fn list_saved_searches(&self, user_id: &UserId) -> RepositoryResult<Vec<SavedSearch>> {
        use crate::schema::saved_searches;

        let mut conn = self.conn()?;

        let items = saved_searches::table
            .filter(saved_searches::user_id.eq(user_id.as_str()))
            .order(saved_searches::created_at.desc())
            .load::<DbSavedSearch>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<SavedSearch>, _>>()?;

        Ok(items)
    }
}

impl SavedSearchWriter for DieselRepository {
    fn create_saved_search(&self, search: &NewSavedSearch) -> RepositoryResult<SavedSearch> {
        use crate::schema::saved_searches;

        let mut conn = self.conn()?;
        let record: DbNewSavedSearch = search.try_into()?;

        let created = diesel::insert_into(saved_searches::table)
            .values(&record)
            .get_result::<DbSavedSearch>(&mut conn)?;

        Ok(created.try_into()?)
    }
}
