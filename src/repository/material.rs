use diesel::prelude::*;

use crate::domain::material::{Material, NewMaterial};
use crate::domain::types::MaterialId;
use crate::models::material::{Material as DbMaterial, NewMaterial as DbNewMaterial};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, MaterialListQuery, MaterialReader, MaterialWriter};

impl MaterialReader for DieselRepository {
    fn list_materials(&self, query: MaterialListQuery) -> RepositoryResult<(usize, Vec<Material>)> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = materials::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(category) = &query.category {
                items = items.filter(materials::category.eq(category.clone()));
            }

            if let Some(vendor) = &query.vendor {
                items = items.filter(materials::vendor_name.eq(vendor.clone()));
            }

            if let Some(availability) = query.availability {
                items = items.filter(materials::availability.eq(availability.as_str()));
            }

            // Unpriced materials never match a price-bounded query.
            if let Some(min_price) = query.min_price {
                items = items.filter(materials::price.ge(min_price));
            }

            if let Some(max_price) = query.max_price {
                items = items.filter(materials::price.le(max_price));
            }

            if let Some(search) = &query.search {
                let pattern = format!("%{search}%");
                items = items.filter(
                    materials::name
                        .like(pattern.clone())
                        .or(materials::description.like(pattern)),
                );
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();

        // Apply pagination if requested
        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        // Final load, freshest sync first
        let items = items
            .order(materials::last_synced.desc())
            .load::<DbMaterial>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Material>, _>>()?;

        Ok((total, items))
    }

    fn get_material_by_id(&self, id: MaterialId) -> RepositoryResult<Option<Material>> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        let material = materials::table
            .filter(materials::id.eq(id.get()))
            .first::<DbMaterial>(&mut conn)
            .optional()?;

        let material = material.map(TryInto::try_into).transpose()?;
        Ok(material)
    }

    fn list_categories(&self) -> RepositoryResult<Vec<String>> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        let categories = materials::table
            .select(materials::category)
            .distinct()
            .order(materials::category.asc())
            .load::<String>(&mut conn)?;

        Ok(categories)
    }

    fn list_vendors(&self) -> RepositoryResult<Vec<String>> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        let vendors = materials::table
            .select(materials::vendor_name)
            .distinct()
            .order(materials::vendor_name.asc())
            .load::<String>(&mut conn)?;

        Ok(vendors)
    }
}

impl MaterialWriter for DieselRepository {
    fn upsert_materials(&self, materials: &[NewMaterial]) -> RepositoryResult<usize> {
        use crate::schema::materials;

        let mut conn = self.conn()?;

        let records = materials
            .iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<DbNewMaterial>, _>>()?;

        // Row-by-row upsert inside one transaction; a batch insert cannot
        // carry per-row conflict updates on SQLite.
        let affected = conn.transaction::<_, RepositoryError, _>(|conn| {
            let mut affected = 0;
            for record in &records {
                affected += diesel::insert_into(materials::table)
                    .values(record)
                    .on_conflict(materials::sku)
                    .do_update()
                    .set(record)
                    .execute(conn)?;
            }
            Ok(affected)
        })?;

        Ok(affected)
    }
}
