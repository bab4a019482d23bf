pub mod html;


pub use html::extract_page;
