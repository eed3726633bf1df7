pub mod city;
pub mod export;
