pub mod cpf;
pub mod response;
