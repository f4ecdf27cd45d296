//! Blog and hospital listings.

use babynest_core::{Blog, Hospital, HospitalFilter, PageParams, Paginated};

use super::{StoreQueries, resource};
use crate::query::{Query, QueryKey};

impl StoreQueries {
    #[must_use]
    pub fn blogs(&self, params: PageParams) -> Query<Paginated<Blog>> {
        let key = QueryKey::new(resource::BLOGS).with(&params);
        self.read(key, &self.services.blog, move |service| {
            let params = params.clone();
            async move { Ok(service.get_blogs(&params).await?.into_data()) }
        })
    }

    #[must_use]
    pub fn blog(&self, slug: &str) -> Query<Option<Blog>> {
        let slug = slug.trim().to_owned();
        let key = QueryKey::new(resource::BLOG).param("slug", &slug);
        self.read(key, &self.services.blog, move |service| {
            let slug = slug.clone();
            async move { Ok(service.get_blog(&slug).await?.data) }
        })
    }

    #[must_use]
    pub fn hospitals(&self, filter: HospitalFilter) -> Query<Paginated<Hospital>> {
        let key = QueryKey::new(resource::HOSPITALS).with(&filter);
        self.read(key, &self.services.hospital, move |service| {
            let filter = filter.clone();
            async move { Ok(service.get_hospitals(&filter).await?.into_data()) }
        })
    }
}
