pub mod pet_mapper;
pub mod user_mapper;
