use kube::ResourceExt;
use kube::api::DynamicObject;
use kube::runtime::watcher::{self, Error};

/// Gets [`DynamicObject`]'s UID.\
/// **Note** that objects without UID get a synthetic one built from their name and namespace.
pub fn get_object_uid(object: &DynamicObject) -> String {
    object.uid().unwrap_or_else(|| {
        format!(
            "_{}{}_",
            object.name_any(),
            object.metadata.namespace.as_deref().unwrap_or_default()
        )
    })
}

/// Checks if specified watcher Error is an API error or any other error.\
/// `check_forbidden` - returns `true` only for forbidden (403) API error.
pub fn is_api_error(error: &watcher::Error, check_forbidden: bool) -> bool {
    match error {
        Error::InitialListFailed(kube::Error::Api(response))
        | Error::WatchStartFailed(kube::Error::Api(response))
        | Error::WatchError(response)
        | Error::WatchFailed(kube::Error::Api(response)) => !check_forbidden || response.code == 403,
        _ => false,
    }
}
