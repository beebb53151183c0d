pub mod access;
pub mod models;
pub mod playlists;
pub mod screens;

pub use access::{require_pin, ACCESS_PIN_HEADER};
pub use models::{__path_handle_get_model, __path_handle_list_models};
pub use models::{handle_get_model, handle_list_models};
pub use playlists::__path_handle_add_items;
pub use playlists::{handle_add_items, PlaylistItemsRequest, PlaylistItemsResponse};
pub use screens::{
    __path_handle_html, __path_handle_image, __path_handle_remove_content, __path_handle_url,
    __path_handle_welcome,
};
pub use screens::{
    handle_html, handle_image, handle_remove_content, handle_url, handle_welcome,
    HtmlScreenRequest, TargetParams, UrlScreenRequest, WelcomeScreenRequest,
};
