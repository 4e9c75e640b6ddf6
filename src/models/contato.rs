// src/models/contato.rs
use serde::Serialize;

pub const CONTATOS_TABLE: &str = "contatos";

// Lista fixa, só de leitura
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Contato {
    pub id: u32,
    pub name: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
}

pub const CONTATOS: &[Contato] = &[
    Contato {
        id: 1,
        name: "João da Silva",
        address: "Rua das Flores, 123 - Centro, Rio de Janeiro - RJ",
        phone: "(21) 98765-4321",
    },
    Contato {
        id: 2,
        name: "Maria Oliveira",
        address: "Av. Brasil, 456 - Copacabana, Rio de Janeiro - RJ",
        phone: "(21) 99876-5432",
    },
];

/// Resultado paginado da lista de contatos.
#[derive(Debug, Clone)]
pub struct ContatosPage {
    pub items: Vec<Contato>,
    pub pagina_atual: usize,
    pub total_paginas: usize,
    pub total_registros: usize,
    pub limite: usize,
}

pub fn paginate(limite: usize, pagina: usize) -> ContatosPage {
    let limite = limite.max(1);
    let pagina = pagina.max(1);
    let total_registros = CONTATOS.len();
    let offset = (pagina - 1).saturating_mul(limite);

    ContatosPage {
        items: CONTATOS.iter().skip(offset).take(limite).copied().collect(),
        pagina_atual: pagina,
        total_paginas: total_registros.div_ceil(limite),
        total_registros,
        limite,
    }
}

pub fn find(id: &str) -> Option<Contato> {
    let id: u32 = id.trim().parse().ok()?;
    CONTATOS.iter().find(|c| c.id == id).copied()
}
