pub mod likes;
pub mod movies;

pub use likes::{LikeService, MovieLikes, TotalLikes};
pub use movies::{Movie, MovieCatalog};
