pub mod ibge;
