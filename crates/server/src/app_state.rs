use studio_api::ApiContext;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) max_upload_bytes: usize,
}

impl AppState {
    pub(crate) fn new(api: ApiContext, max_upload_bytes: usize) -> Self {
        Self {
            api,
            max_upload_bytes,
        }
    }
}
