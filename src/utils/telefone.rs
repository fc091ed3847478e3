/// Normalização de telefones para o snapshot dos leads.
///
/// O motor de disparo espera números apenas com dígitos, com DDI. Números
/// brasileiros sem DDI ganham o prefixo 55.
pub fn normalizar_telefone(telefone: &str) -> String {
    let digitos: String = telefone.chars().filter(|c| c.is_ascii_digit()).collect();

    // 10 ou 11 dígitos: DDD + número local, sem DDI
    if digitos.len() == 10 || digitos.len() == 11 {
        return format!("55{}", digitos);
    }

    digitos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_formatacao() {
        assert_eq!(normalizar_telefone("+55 (11) 99999-0001"), "5511999990001");
    }

    #[test]
    fn test_adiciona_ddi_quando_ausente() {
        assert_eq!(normalizar_telefone("(11) 99999-0001"), "5511999990001");
        assert_eq!(normalizar_telefone("11 3333-0001"), "551133330001");
    }

    #[test]
    fn test_mantem_numero_com_ddi() {
        assert_eq!(normalizar_telefone("5511999990001"), "5511999990001");
    }
}
