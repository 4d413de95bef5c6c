use serde::Serialize;

/// A named group of neighborhoods, offered as a one-click multi-select.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Zone {
    pub slug: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub neighborhoods: &'static [&'static str],
}

pub const ZONES: [Zone; 5] = [
    Zone {
        slug: "centro",
        name: "Centro",
        city: "Rio de Janeiro",
        neighborhoods: &[
            "Catumbi", "Centro", "Cidade Nova", "Gamboa", "Glória", "Lapa", "Rio Comprido",
            "Santa Teresa", "Santo Cristo", "Saúde",
        ],
    },
    Zone {
        slug: "zona-sul",
        name: "Zona Sul",
        city: "Rio de Janeiro",
        neighborhoods: &[
            "Botafogo", "Catete", "Copacabana", "Cosme Velho", "Flamengo", "Gávea", "Humaitá",
            "Ipanema", "Jardim Botânico", "Lagoa", "Laranjeiras", "Leblon", "Leme", "São Conrado", "Urca",
        ],
    },
    Zone {
        slug: "zona-norte",
        name: "Zona Norte",
        city: "Rio de Janeiro",
        neighborhoods: &[
            "Andaraí", "Engenho Novo", "Grajaú", "Ilha do Governador", "Irajá", "Madureira",
            "Maracanã", "Méier", "Olaria", "Pavuna", "Penha", "Ramos", "Tijuca", "Vila Isabel",
            "Vista Alegre",
        ],
    },
    Zone {
        slug: "zona-oeste",
        name: "Zona Oeste",
        city: "Rio de Janeiro",
        neighborhoods: &[
            "Bangu", "Campo Grande", "Guaratiba", "Jardim Sulacap", "Padre Miguel", "Realengo",
            "Santa Cruz", "Senador Camará", "Sepetiba",
        ],
    },
    Zone {
        slug: "barra-jacarepagua",
        name: "Barra e Jacarepaguá",
        city: "Rio de Janeiro",
        neighborhoods: &[
            "Anil", "Barra da Tijuca", "Camorim", "Curicica", "Freguesia", "Itanhangá", "Jacarepaguá",
            "Pechincha", "Recreio dos Bandeirantes", "Taquara", "Vargem Grande", "Vargem Pequena",
        ],
    },
];

pub fn find_zone(slug: &str) -> Option<&'static Zone> {
    let slug = slug.trim().to_lowercase();
    ZONES.iter().find(|z| z.slug == slug)
}

/// Union of the neighborhoods of the given zones, in zone order, without
/// duplicates. Unknown slugs contribute nothing.
pub fn expand_zones<S: AsRef<str>>(slugs: &[S]) -> Vec<&'static str> {
    let mut expanded: Vec<&'static str> = Vec::new();
    for zone in slugs.iter().filter_map(|s| find_zone(s.as_ref())) {
        for neighborhood in zone.neighborhoods {
            if !expanded.contains(neighborhood) {
                expanded.push(neighborhood);
            }
        }
    }
    expanded
}
